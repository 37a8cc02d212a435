//! Volunteer area tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Area of work a volunteer can sign up for.
///
/// The set is closed; every variant has a display label in
/// [`VolunteerArea::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolunteerArea {
    /// Day-to-day animal care.
    CuidadoAnimales,
    /// Cleaning.
    Limpieza,
    /// Dog walking.
    Paseos,
    /// Socialisation.
    Socializacion,
    /// Transport.
    Transporte,
    /// Events.
    Eventos,
    /// Communications.
    Comunicacion,
    /// Administration.
    Administracion,
    /// Veterinary support.
    Veterinaria,
    /// Maintenance.
    Mantenimiento,
    /// Adoptions.
    Adopciones,
    /// Education.
    Educacion,
    /// Fundraising.
    Recaudacion,
    /// Photography.
    Fotografia,
}

impl VolunteerArea {
    /// Every area, in display order.
    pub const ALL: [Self; 14] = [
        Self::CuidadoAnimales,
        Self::Limpieza,
        Self::Paseos,
        Self::Socializacion,
        Self::Transporte,
        Self::Eventos,
        Self::Comunicacion,
        Self::Administracion,
        Self::Veterinaria,
        Self::Mantenimiento,
        Self::Adopciones,
        Self::Educacion,
        Self::Recaudacion,
        Self::Fotografia,
    ];

    /// Stored and wire code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::CuidadoAnimales => "CUIDADO_ANIMALES",
            Self::Limpieza => "LIMPIEZA",
            Self::Paseos => "PASEOS",
            Self::Socializacion => "SOCIALIZACION",
            Self::Transporte => "TRANSPORTE",
            Self::Eventos => "EVENTOS",
            Self::Comunicacion => "COMUNICACION",
            Self::Administracion => "ADMINISTRACION",
            Self::Veterinaria => "VETERINARIA",
            Self::Mantenimiento => "MANTENIMIENTO",
            Self::Adopciones => "ADOPCIONES",
            Self::Educacion => "EDUCACION",
            Self::Recaudacion => "RECAUDACION",
            Self::Fotografia => "FOTOGRAFIA",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CuidadoAnimales => "Cuidado de Animales",
            Self::Limpieza => "Limpieza",
            Self::Paseos => "Paseos",
            Self::Socializacion => "Socialización",
            Self::Transporte => "Transporte",
            Self::Eventos => "Eventos",
            Self::Comunicacion => "Comunicación",
            Self::Administracion => "Administración",
            Self::Veterinaria => "Veterinaria",
            Self::Mantenimiento => "Mantenimiento",
            Self::Adopciones => "Adopciones",
            Self::Educacion => "Educación",
            Self::Recaudacion => "Recaudación",
            Self::Fotografia => "Fotografía",
        }
    }
}

impl fmt::Display for VolunteerArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned for codes outside the area table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown volunteer area: {0}")]
pub struct UnknownArea(pub String);

impl FromStr for VolunteerArea {
    type Err = UnknownArea;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|area| area.code() == s)
            .ok_or_else(|| UnknownArea(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_round_trip_for_every_area() {
        for area in VolunteerArea::ALL {
            assert_eq!(area.code().parse::<VolunteerArea>(), Ok(area));
            let json = serde_json::to_value(area).expect("serialise area");
            assert_eq!(json, serde_json::json!(area.code()));
        }
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<_> = VolunteerArea::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), VolunteerArea::ALL.len());
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(
            "cuidado_animales".parse::<VolunteerArea>(),
            Err(UnknownArea("cuidado_animales".to_owned()))
        );
    }
}
