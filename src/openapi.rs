use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::health, crate::api::stamp, crate::api::map_snapshot),
    components(schemas(
        crate::api::StampRequest,
        crate::model::CustomConfig,
        crate::model::LocationRecord,
        crate::model::TimeStamp,
    )),
    tags((name = "geostamp", description = "GPS watermark compositing"))
)]
pub struct ApiDoc;
