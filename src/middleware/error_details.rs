// src/middleware/error_details.rs

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::common::error::InternalErrorDetail;

/// Copia a causa dos erros 500 para o campo `error` do corpo.
/// Montado só fora de produção.
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    (
        response.status(),
        Json(json!({
            "success": false,
            "message": "Erro interno do servidor",
            "error": detail,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::common::error::AppError;

    async fn failing() -> Result<(), AppError> {
        Err(AppError::InternalServerError(anyhow::anyhow!("conexão recusada")))
    }

    async fn not_found() -> Result<(), AppError> {
        Err(AppError::not_found("Lead"))
    }

    async fn call(router: Router, uri: &str) -> (u16, Value) {
        let response = router
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn router() -> Router {
        Router::new()
            .route("/falha", get(failing))
            .route("/sumiu", get(not_found))
    }

    #[tokio::test]
    async fn cause_reaches_the_body_when_mounted() {
        let app = router().layer(middleware::from_fn(expose_error_details));

        let (status, body) = call(app, "/falha").await;

        assert_eq!(status, 500);
        assert_eq!(body["message"], "Erro interno do servidor");
        assert!(body["error"].as_str().unwrap().contains("conexão recusada"));
    }

    #[tokio::test]
    async fn cause_stays_hidden_without_the_layer() {
        let (status, body) = call(router(), "/falha").await;

        assert_eq!(status, 500);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn client_errors_pass_through_untouched() {
        let app = router().layer(middleware::from_fn(expose_error_details));

        let (status, body) = call(app, "/sumiu").await;

        assert_eq!(status, 404);
        assert_eq!(body["message"], "Lead não encontrado");
        assert!(body.get("error").is_none());
    }
}
