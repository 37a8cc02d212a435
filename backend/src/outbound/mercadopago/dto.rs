//! Wire DTOs for the MercadoPago preference and payment APIs.
//!
//! Requests are built from the domain's [`CheckoutPreference`]; responses are
//! decoded here and mapped into domain records in one pass.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CheckoutPreference, CheckoutSession};
use crate::domain::{GatewayPayment, GatewayPaymentStatus};

/// Area code sent with donor phone numbers.
const PHONE_AREA_CODE: &str = "379";

#[derive(Debug, Serialize)]
pub(super) struct PreferenceRequestDto<'a> {
    items: [PreferenceItemDto<'a>; 1],
    payer: PayerDto<'a>,
    back_urls: BackUrlsDto<'a>,
    auto_return: &'static str,
    notification_url: &'a str,
    external_reference: &'a str,
    payment_methods: PaymentMethodsDto,
    expires: bool,
    expiration_date_from: String,
    expiration_date_to: String,
}

#[derive(Debug, Serialize)]
struct PreferenceItemDto<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    quantity: u32,
    unit_price: f64,
    currency_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PayerDto<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<PhoneDto<'a>>,
}

#[derive(Debug, Serialize)]
struct PhoneDto<'a> {
    area_code: &'static str,
    number: &'a str,
}

#[derive(Debug, Serialize)]
struct BackUrlsDto<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Debug, Serialize)]
struct PaymentMethodsDto {
    excluded_payment_methods: [(); 0],
    excluded_payment_types: [(); 0],
    installments: u8,
}

impl<'a> From<&'a CheckoutPreference> for PreferenceRequestDto<'a> {
    fn from(preference: &'a CheckoutPreference) -> Self {
        Self {
            items: [PreferenceItemDto {
                id: &preference.item_id,
                title: &preference.title,
                description: &preference.description,
                quantity: 1,
                unit_price: preference.unit_price,
                currency_id: &preference.currency,
            }],
            payer: PayerDto {
                name: &preference.payer_name,
                email: &preference.payer_email,
                phone: preference.payer_phone.as_deref().map(|number| PhoneDto {
                    area_code: PHONE_AREA_CODE,
                    number,
                }),
            },
            back_urls: BackUrlsDto {
                success: &preference.back_urls.success,
                failure: &preference.back_urls.failure,
                pending: &preference.back_urls.pending,
            },
            auto_return: "approved",
            notification_url: &preference.notification_url,
            external_reference: &preference.external_reference,
            payment_methods: PaymentMethodsDto {
                excluded_payment_methods: [],
                excluded_payment_types: [],
                installments: preference.max_installments,
            },
            expires: true,
            expiration_date_from: preference
                .expires_from
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            expiration_date_to: preference
                .expires_to
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PreferenceResponseDto {
    id: String,
    init_point: String,
    #[serde(default)]
    sandbox_init_point: Option<String>,
}

impl From<PreferenceResponseDto> for CheckoutSession {
    fn from(dto: PreferenceResponseDto) -> Self {
        Self {
            preference_id: dto.id,
            init_point: dto.init_point,
            sandbox_init_point: dto.sandbox_init_point,
        }
    }
}

/// Payment ids arrive as JSON numbers from the payments API but as strings
/// in some webhook payloads; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaymentIdDto {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct PaymentMethodDto {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentResponseDto {
    id: PaymentIdDto,
    status: String,
    #[serde(default)]
    external_reference: Option<String>,
    /// Nested method object; its `type` is the method family.
    #[serde(default)]
    payment_method: Option<PaymentMethodDto>,
    /// Flat copy of the method family on older payloads.
    #[serde(default)]
    payment_type_id: Option<String>,
}

impl From<PaymentResponseDto> for GatewayPayment {
    fn from(dto: PaymentResponseDto) -> Self {
        let id = match dto.id {
            PaymentIdDto::Number(id) => id.to_string(),
            PaymentIdDto::Text(id) => id,
        };
        Self {
            id,
            status: GatewayPaymentStatus::from_gateway(&dto.status),
            external_reference: dto.external_reference.filter(|value| !value.is_empty()),
            payment_method: dto
                .payment_method
                .and_then(|method| method.kind)
                .or(dto.payment_type_id)
                .filter(|kind| !kind.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{Value, json};

    use crate::domain::ports::CheckoutBackUrls;

    fn preference(phone: Option<&str>) -> CheckoutPreference {
        let from = Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("timestamp");
        CheckoutPreference {
            external_reference: "DON-1748779200000-k3j9x0p1q".to_owned(),
            item_id: "donacion-DON-1748779200000-k3j9x0p1q".to_owned(),
            title: "Donación a Fundación Paz Animal".to_owned(),
            description: "Para el refugio".to_owned(),
            unit_price: 2500.0,
            currency: "ARS".to_owned(),
            payer_name: "Donante Anónimo".to_owned(),
            payer_email: "donante@pazanimal.org".to_owned(),
            payer_phone: phone.map(str::to_owned),
            back_urls: CheckoutBackUrls {
                success: "http://localhost:3000/donacion/exito?id=1".to_owned(),
                failure: "http://localhost:3000/donacion/error?id=1".to_owned(),
                pending: "http://localhost:3000/donacion/pendiente?id=1".to_owned(),
            },
            notification_url: "http://localhost:3000/api/v1/webhooks/mercadopago".to_owned(),
            max_installments: 12,
            expires_from: from,
            expires_to: from + Duration::days(7),
        }
    }

    #[test]
    fn preference_requests_match_the_wire_shape() {
        let preference = preference(Some("4123456"));
        let body: Value =
            serde_json::to_value(PreferenceRequestDto::from(&preference)).expect("serialises");

        assert_eq!(body["items"][0]["quantity"], 1);
        assert_eq!(body["items"][0]["currency_id"], "ARS");
        assert_eq!(body["payer"]["phone"], json!({ "area_code": "379", "number": "4123456" }));
        assert_eq!(body["auto_return"], "approved");
        assert_eq!(body["payment_methods"]["installments"], 12);
        assert_eq!(body["payment_methods"]["excluded_payment_types"], json!([]));
        assert_eq!(body["expiration_date_to"], "2025-06-08T12:00:00.000Z");
    }

    #[test]
    fn payer_phone_is_omitted_when_absent() {
        let preference = preference(None);
        let body: Value =
            serde_json::to_value(PreferenceRequestDto::from(&preference)).expect("serialises");
        assert!(body["payer"].get("phone").is_none());
    }

    #[test]
    fn payments_decode_numeric_ids_and_blank_references() {
        let dto: PaymentResponseDto = serde_json::from_value(json!({
            "id": 123_456_789_u64,
            "status": "in_process",
            "external_reference": "",
            "payment_method_id": "visa",
            "payment_type_id": "credit_card"
        }))
        .expect("decodes");
        let payment = GatewayPayment::from(dto);

        assert_eq!(payment.id, "123456789");
        assert_eq!(
            payment.status,
            GatewayPaymentStatus::Other("in_process".to_owned())
        );
        assert_eq!(payment.external_reference, None);
        assert_eq!(payment.payment_method.as_deref(), Some("credit_card"));
    }

    #[test]
    fn payments_api_bodies_report_the_method_type() {
        let dto: PaymentResponseDto = serde_json::from_value(json!({
            "id": 1_318_207_449_u64,
            "date_created": "2025-06-01T10:02:11.000-04:00",
            "date_approved": "2025-06-01T10:02:13.000-04:00",
            "status": "approved",
            "status_detail": "accredited",
            "currency_id": "ARS",
            "transaction_amount": 2500,
            "external_reference": "DON-1748779200000-k3j9x0p1q",
            "payment_method_id": "master",
            "payment_type_id": "debit_card",
            "payment_method": {
                "id": "master",
                "type": "debit_card",
                "issuer_id": "3"
            },
            "payer": { "email": "donante@pazanimal.org" }
        }))
        .expect("decodes");
        let payment = GatewayPayment::from(dto);

        assert_eq!(payment.id, "1318207449");
        assert_eq!(payment.status, GatewayPaymentStatus::Approved);
        assert_eq!(
            payment.external_reference.as_deref(),
            Some("DON-1748779200000-k3j9x0p1q")
        );
        assert_eq!(payment.payment_method.as_deref(), Some("debit_card"));
    }

    #[test]
    fn payments_without_method_details_leave_it_unset() {
        let dto: PaymentResponseDto =
            serde_json::from_value(json!({ "id": "77", "status": "pending" })).expect("decodes");
        assert_eq!(GatewayPayment::from(dto).payment_method, None);
    }
}
