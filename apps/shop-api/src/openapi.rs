use utoipa::OpenApi;

use crate::api::{self, dto::ShipmentResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::shipments::create_shipment,
        api::shipments::get_shipment,
        api::shipments::dispatch_shipment,
        api::shipments::deliver_shipment,
    ),
    components(
        schemas(axum_helpers::ErrorResponse, ShipmentResponse)
    ),
    info(
        title = "Shop API",
        version = "0.1.0",
        description = "Catalog, accounts, orders and fulfilment of the shop backend"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/auth", api = api::auth::ApiDoc),
        (path = "/categories", api = api::categories::ApiDoc),
        (path = "/products", api = api::products::ApiDoc),
        (path = "/orders", api = api::orders::ApiDoc)
    ),
    tags(
        (name = api::shipments::TAG, description = "Shipment lifecycle")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/auth/register",
            "/categories",
            "/categories/{id_or_slug}/products",
            "/products/{id}",
            "/orders",
            "/orders/{id}/shipments",
            "/shipments/{id}/dispatch",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }
}
