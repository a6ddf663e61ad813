use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl Error {
    /// Map a non-2xx response status to the matching variant, carrying any
    /// message text the server attached to the body.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => Self::UnprocessableEntity(message),
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(source) => source.status().map(|s| s.as_u16()),
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::UnprocessableEntity(_) => Some(422),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// The inline banner message a page would render for this failure.
    /// Pages historically special-case 422, 403, 404 and 409; everything else
    /// collapses into a generic message.
    pub fn user_message(&self) -> &'static str {
        match self.status() {
            Some(422) => "Some fields are invalid, please check your input.",
            Some(403) => "You are not allowed to perform this action.",
            Some(404) => "The requested record does not exist anymore.",
            Some(409) => "This record already exists.",
            _ => "Something went wrong, please retry later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use reqwest::StatusCode;

    #[test]
    fn maps_statuses_to_variants() {
        assert!(matches!(
            Error::from_status(StatusCode::CONFLICT, "dup"),
            Error::Conflict(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            Error::UnprocessableEntity(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::BAD_GATEWAY, ""),
            Error::Api { status: 502, .. }
        ));
    }

    #[test]
    fn user_messages_follow_status_taxonomy() {
        let conflict = Error::from_status(StatusCode::CONFLICT, "");
        assert_eq!(conflict.user_message(), "This record already exists.");

        let teapot = Error::from_status(StatusCode::IM_A_TEAPOT, "");
        assert_eq!(
            teapot.user_message(),
            "Something went wrong, please retry later."
        );
    }

    #[test]
    fn unauthorized_detection() {
        assert!(Error::Unauthorized("expired".into()).is_unauthorized());
        assert!(!Error::NotFound("gone".into()).is_unauthorized());
    }
}
