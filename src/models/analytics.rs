// src/models/analytics.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Previsão de Demanda ---
// Saída de `predict_demand`. A confiança é um proxy cru de tamanho de
// amostra (pontos/100, presa entre 0.5 e 0.95), não uma grandeza
// estatística.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandPrediction {
    pub predicted_demand: i64,
    pub confidence: f64,
    pub data_points: i64,

    #[schema(example = "Previsão baseada em padrões históricos")]
    pub message: String,
}

// Envelope da rota predict-demand, com o contexto de estoque do item.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictDemandResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub prediction: DemandPrediction,
    pub current_stock: i64,
    pub min_stock: i64,
}

// --- Recomendação de Reposição ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRecommendation {
    pub current_stock: i64,
    pub min_stock: i64,
    pub predicted_demand: i64,
    pub safety_stock: i64,
    pub optimal_stock: i64,
    pub recommended_reorder: i64,
    pub confidence: f64,
}

// --- Relatório de Anomalia ---
// Consultivo: nunca bloqueia a criação de uma solicitação.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub is_anomaly: bool,
    pub score: f64,
    pub z_score: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub reasons: Vec<String>,
}

// Achado persistido em `ml_anomalies`, com os nomes que a tela do admin
// exibe.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: Uuid,
    pub request_id: Option<Uuid>,
    pub item_id: Uuid,

    #[schema(example = "unusual_quantity")]
    pub anomaly_type: String,

    pub anomaly_score: f64,
    pub description: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,

    pub item_name: Option<String>,
    pub patient_name: Option<String>,
}

// --- Dados de Treino ---
// Uma amostra derivada do histórico de solicitações: características de
// calendário -> quantidade.
#[derive(Debug, Clone, FromRow)]
pub struct TrainingPoint {
    pub item_id: Uuid,
    pub quantity: i64,
    pub month: i64,
    pub day_of_week: i64,
    pub season: i64,
    pub category: String,
    pub source_date: NaiveDate,
}

// Entrada do cache de previsões (`ml_predictions`).
#[derive(Debug, Clone, FromRow)]
pub struct CachedPrediction {
    pub predicted_demand: i64,
    pub confidence: f64,
}

// Amostra do histórico de um item usada pelo detector de anomalias.
#[derive(Debug, Clone, FromRow)]
pub struct HistoricalRequest {
    pub quantity: i64,
    pub doctor_id: Uuid,
}

// Linha crua de `requests` da qual o treino deriva as características de
// calendário.
#[derive(Debug, Clone, FromRow)]
pub struct TrainingSource {
    pub quantity: i64,
    pub requested_at: DateTime<Utc>,
}

// --- Treino de Modelos ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainedItemReport {
    pub item_id: Uuid,

    #[schema(example = "trained")]
    pub status: String,

    pub data_points: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainModelsResponse {
    pub status: String,
    pub trained_items: usize,
    pub results: Vec<TrainedItemReport>,
}
