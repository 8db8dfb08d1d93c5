use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub fn list<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<ListResponse<T>>) {
    (
        StatusCode::OK,
        Json(ListResponse {
            success: true,
            count: data.len(),
            data,
        }),
    )
}

pub fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.to_string(),
        }),
    )
}
