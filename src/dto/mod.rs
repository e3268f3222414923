pub mod api_response;
pub mod query_dto;

pub use api_response::ApiResponse;
pub use query_dto::ListParams;
