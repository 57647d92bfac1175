// src/services/geolocation.rs

use std::net::IpAddr;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::lead::GeoLocation;

/// Geolocalização reversa de IP. Falhas nunca impedem o cadastro do lead.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self, ip: IpAddr) -> anyhow::Result<GeoLocation>;
}

/// Cliente do ip-api.com (`GET {base}/{ip}`).
pub struct IpApiGeolocator {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiGeolocator {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Geolocator for IpApiGeolocator {
    async fn locate(&self, ip: IpAddr) -> anyhow::Result<GeoLocation> {
        let url = format!("{}/{}", self.base_url, ip);

        let body: IpApiResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("Falha na chamada de geolocalização")?
            .error_for_status()?
            .json()
            .await
            .context("Resposta de geolocalização ilegível")?;

        body.into_location()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_location(self) -> anyhow::Result<GeoLocation> {
        if self.status != "success" {
            return Err(anyhow!(
                "Geolocalização sem sucesso: {}",
                self.message.unwrap_or(self.status)
            ));
        }

        Ok(GeoLocation {
            city: self.city,
            state: self.region_name,
            country: self.country,
            latitude: self.lat,
            longitude: self.lon,
        })
    }
}
