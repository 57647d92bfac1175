// src/services/contract_extractor.rs

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Serviço identificado na descrição, com valor mensal em reais.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedService {
    pub name: String,
    pub value: Option<f64>,
}

/// Resultado estruturado da leitura de uma descrição livre de contrato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractExtraction {
    pub services: Vec<ExtractedService>,
    /// Valor mensal total, em reais
    pub total_value: Option<f64>,
    /// Meses
    pub duration: Option<f64>,
    pub total_contract: Option<f64>,
}

impl ContractExtraction {
    /// Duração aproveitável (inteiro positivo).
    pub fn duration_months(&self) -> Option<i32> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 1.0)
            .map(|d| d.round() as i32)
    }
}

/// Extração best-effort: qualquer falha é um `Err` e o chamador segue sem ela.
#[async_trait]
pub trait ContractExtractor: Send + Sync {
    async fn extract(&self, description: &str) -> anyhow::Result<ContractExtraction>;
}

const SYSTEM_PROMPT: &str =
    "Você é um assistente especializado em processar contratos. Retorne APENAS JSON válido, sem markdown.";

const INSTRUCTIONS: &str = r#"Você processa descrições de contratos de marketing digital e desenvolvimento web.
Extraia as informações da descrição abaixo e responda somente com um objeto JSON:
{
  "services": [{ "name": "Nome padronizado do serviço", "value": valor_mensal_em_reais }],
  "totalValue": valor_mensal_total,
  "duration": duracao_em_meses,
  "totalContract": valor_total_do_contrato
}

Regras:
1. Nomes padronizados: tráfego/ads → "Tráfego Pago"; mídias/social media → "Mídias Sociais";
   site/website/landing page → "Desenvolvimento de Site"; seo → "SEO";
   email marketing → "Email Marketing"; design → "Design Gráfico";
   copywriting/redação → "Copywriting"; consultoria → "Consultoria".
2. Valor total sem divisão por serviço: divida igualmente entre os serviços citados.
3. Sem valor informado: null nos campos de valor.
4. Sem duração informada: null em duration.
5. totalContract = totalValue * duration.
6. Valores são números, sem "R$" e sem separador de milhar.

Exemplo: "contrato de 3 meses por 750 de trafego, midias sociais e site" →
{"services":[{"name":"Tráfego Pago","value":250},{"name":"Mídias Sociais","value":250},{"name":"Desenvolvimento de Site","value":250}],"totalValue":750,"duration":3,"totalContract":2250}"#;

/// Extrator via API de chat completions compatível com OpenAI.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiExtractor {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl ContractExtractor for OpenAiExtractor {
    async fn extract(&self, description: &str) -> anyhow::Result<ContractExtraction> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("{}\n\nDESCRIÇÃO: \"{}\"", INSTRUCTIONS, description) },
            ],
            "temperature": 0.3,
            "max_tokens": 500,
        });

        let completion: ChatCompletion = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Falha na chamada ao provedor de IA")?
            .error_for_status()?
            .json()
            .await
            .context("Resposta do provedor de IA ilegível")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Resposta da IA sem conteúdo"))?;

        parse_extraction(&content)
    }
}

/// Lê o JSON devolvido pelo modelo, tolerando cercas de Markdown.
pub fn parse_extraction(content: &str) -> anyhow::Result<ContractExtraction> {
    let text = content.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    serde_json::from_str(text).context("Resposta da IA inválida")
}
