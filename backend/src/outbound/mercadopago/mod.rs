//! MercadoPago outbound adapter.
//!
//! A thin HTTP implementation of the `PaymentGateway` port: checkout
//! preference creation and authoritative payment lookup.

mod dto;
mod http_gateway;

pub use http_gateway::{MercadoPagoGateway, MercadoPagoSettings};
