//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crm_backend::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG sobrescreve o filtro padrão
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crm_backend=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let port = config.port;

    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    bootstrap_admin(&app_state).await;

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, crm_backend::app(app_state))
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}

// Cria o admin de ADMIN_EMAIL/ADMIN_PASSWORD, se configurado. Falha não derruba o boot.
async fn bootstrap_admin(app_state: &AppState) {
    let config = &app_state.config;
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return;
    };

    match app_state
        .auth_service
        .ensure_admin(&config.admin_name, email, password)
        .await
    {
        Ok(true) => tracing::info!("👤 Administrador {} criado", email),
        Ok(false) => tracing::info!("Administrador {} já cadastrado", email),
        Err(e) => tracing::error!("Falha ao criar administrador {}: {}", email, e),
    }
}
