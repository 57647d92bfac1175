// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::{dashboard_repo::DashboardSnapshot, DashboardRepository},
    models::dashboard::DashboardStats,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // Recalculado a cada chamada, sem cache
    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let snapshot = self.repo.snapshot().await?;
        Ok(build_stats(snapshot))
    }
}

fn build_stats(snapshot: DashboardSnapshot) -> DashboardStats {
    DashboardStats {
        conversion_rate: conversion_rate(snapshot.closed_leads, snapshot.total_leads),
        total_leads: snapshot.total_leads,
        active_contracts: snapshot.active_contracts,
        total_value: snapshot.total_value,
        renewal_count: snapshot.renewal_count,
        recent_leads: snapshot.recent_leads,
        leads_by_classification: snapshot.leads_by_classification,
        leads_by_status: snapshot.leads_by_status,
    }
}

/// Percentual de leads fechados com duas casas. Sem leads, 0.
pub fn conversion_rate(closed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = closed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
