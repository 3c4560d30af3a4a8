use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(DomainError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Internal(msg) => AppError::Internal(msg),
            other => AppError::Domain(other),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Domain(DomainError::OutOfStock { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Domain(DomainError::CartEmpty | DomainError::BadParameter(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Domain(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Domain(e) => {
                log::warn!("{}: {}", e.code(), e);
                HttpResponse::build(self.status_code()).json(serde_json::json!({
                    "code": e.code(),
                    "error": e.summary(),
                    "details": e.to_string(),
                }))
            }
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "code": "INTERNAL_SERVER_ERROR",
                    "error": "Internal server error"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use uuid::Uuid;

    fn status_of(e: DomainError) -> StatusCode {
        AppError::from(e).error_response().status()
    }

    #[test]
    fn not_found_variants_return_404() {
        let id = Uuid::new_v4();
        for e in [
            DomainError::CustomerNotFound(id),
            DomainError::ProductNotFound(vec![id]),
            DomainError::OrderNotFound(id),
            DomainError::PaymentNotFound(id),
        ] {
            assert_eq!(status_of(e), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            status_of(DomainError::Conflict("cart".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn out_of_stock_returns_422() {
        let e = DomainError::OutOfStock {
            product_id: None,
            requested: 5,
            available: 7,
        };
        assert_eq!(status_of(e), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn business_rejections_return_400() {
        assert_eq!(status_of(DomainError::CartEmpty), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::BadParameter("qty".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn internal_error_display() {
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }
}
