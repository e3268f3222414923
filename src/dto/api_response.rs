use serde::Serialize;

/// Response genérica de escrituras
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    /// Claves de cache purgadas por la escritura
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidated: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            invalidated: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
            invalidated: None,
        }
    }

    pub fn invalidated(mut self, deleted: u64) -> Self {
        self.invalidated = Some(deleted);
        self
    }
}
