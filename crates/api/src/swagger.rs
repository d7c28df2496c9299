//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "B2B Marketing Attribution API",
        version = "0.1.0",
        description = "Computes per-touchpoint attribution under five weighting models plus a combined model, and derives channel-performance and sales/marketing alignment diagnostics.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Attribution", description = "Calculate, channel-insights, and alignment-report operations"),
        (name = "Model", description = "Model introspection — touchpoint types, weights, expected cycles"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    components(schemas(
        crate::rest::HealthResponse,
        crate::error::ErrorBody,
    ))
)]
pub struct ApiDoc;
