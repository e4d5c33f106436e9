use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("configuración inválida: {0}")]
    Configuration(String),
    #[error("error de red: {0}")]
    Network(#[from] reqwest::Error),
    #[error("el servicio de IA respondió {status}: {message}")]
    Api { status: u16, message: String },
    #[error("respuesta sin contenido")]
    EmptyCompletion,
}
