// src/services/request_service.rs

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, RequestRepository, UserRepository},
    models::auth::Role,
    models::inventory::StockAdjustment,
    models::request::{Request, RequestPriority, RequestStatus},
    services::activity_service::ActivityService,
    services::analytics_service::AnalyticsService,
};

// O engine do ciclo de vida das solicitações. A propriedade central é o
// pareamento transacional: mudança de status e baixa de estoque comitam
// juntas ou não acontecem. O SQLite serializa os escritores, então duas
// aprovações simultâneas nunca passam as duas pela checagem de saldo.
#[derive(Clone)]
pub struct RequestService {
    request_repo: RequestRepository,
    inventory_repo: InventoryRepository,
    user_repo: UserRepository,
    activity_service: ActivityService,
    analytics_service: AnalyticsService,
    pool: SqlitePool,
}

impl RequestService {
    pub fn new(
        request_repo: RequestRepository,
        inventory_repo: InventoryRepository,
        user_repo: UserRepository,
        activity_service: ActivityService,
        analytics_service: AnalyticsService,
        pool: SqlitePool,
    ) -> Self {
        Self {
            request_repo,
            inventory_repo,
            user_repo,
            activity_service,
            analytics_service,
            pool,
        }
    }

    // ---
    // CRIAÇÃO (médico)
    // ---

    /// Cria uma solicitação de medicamento.
    ///
    /// Item controlado: entra PENDING com prioridade alta e o estoque não é
    /// tocado; a baixa só acontece na aprovação do farmacêutico.
    /// Item comum: auto-aprovado, mas somente se houver saldo; a criação do
    /// registro e a baixa do estoque comitam na mesma transação.
    pub async fn create_request(
        &self,
        doctor_id: Uuid,
        item_id: Uuid,
        quantity: i64,
        patient_id: &str,
        patient_name: &str,
        notes: Option<&str>,
    ) -> Result<Request, AppError> {
        // O engine valida por conta própria, independente do que a camada
        // HTTP já checou.
        let patient_id = patient_id.trim();
        let patient_name = patient_name.trim();
        if patient_id.is_empty() {
            return Err(AppError::MissingField("patientId"));
        }
        if patient_name.is_empty() {
            return Err(AppError::MissingField("patientName"));
        }
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let item = self
            .inventory_repo
            .find_by_id(&mut *tx, item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        let (status, priority) = if item.controlled {
            (RequestStatus::Pending, RequestPriority::High)
        } else {
            // Saldo no limite exato é válido (estoque zera, não é erro).
            if item.stock < quantity {
                return Err(AppError::InsufficientStock {
                    available: item.stock,
                    requested: quantity,
                });
            }
            (RequestStatus::Approved, RequestPriority::Normal)
        };

        let request_id = self
            .request_repo
            .create(
                &mut *tx,
                doctor_id,
                item_id,
                quantity,
                patient_id,
                patient_name,
                notes,
                status,
                priority,
            )
            .await?;

        if status == RequestStatus::Approved {
            self.inventory_repo
                .adjust_stock(&mut *tx, item_id, quantity, StockAdjustment::Subtract)
                .await?;
        }

        let request = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        tx.commit().await?;

        let description = match status {
            RequestStatus::Approved => format!(
                "Solicitou {} (Quantidade: {}) - Estoque reduzido",
                item.name, quantity
            ),
            _ => format!("Solicitou {} (Quantidade: {})", item.name, quantity),
        };
        self.activity_service
            .record(doctor_id, &description, &status.to_string())
            .await;

        // Avaliação consultiva de anomalia; nunca bloqueia a criação.
        self.flag_if_anomalous(&request).await;

        Ok(request)
    }

    async fn flag_if_anomalous(&self, request: &Request) {
        match self
            .analytics_service
            .detect_anomaly(
                request.item_id,
                request.quantity,
                request.doctor_id,
                Some(request.id),
            )
            .await
        {
            Ok(report) if report.is_anomaly => {
                if let Err(e) = self
                    .analytics_service
                    .record_finding(Some(request.id), request.item_id, &report)
                    .await
                {
                    tracing::warn!("Falha ao persistir achado de anomalia: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Falha ao avaliar anomalia da solicitação {}: {}",
                    request.id,
                    e
                );
            }
        }
    }

    // ---
    // APROVAÇÃO / REJEIÇÃO (farmacêutico)
    // ---

    /// Aprova uma solicitação pendente, baixando o estoque na mesma
    /// transação. Re-aprovar uma solicitação já aprovada é um no-op
    /// bem-sucedido.
    pub async fn approve(&self, request_id: Uuid, approver_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        if request.status == RequestStatus::Approved {
            return Ok(request);
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition {
                current: request.status,
            });
        }

        let item = self
            .inventory_repo
            .find_by_id(&mut *tx, request.item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        // O saldo vale no momento da aprovação, não no da criação.
        if item.stock < request.quantity {
            return Err(AppError::InsufficientStock {
                available: item.stock,
                requested: request.quantity,
            });
        }

        let approved_by = self
            .user_repo
            .find_by_id(&mut *tx, approver_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "Farmacêutico".to_string());

        self.request_repo
            .set_approved(&mut *tx, request_id, &approved_by)
            .await?;
        self.inventory_repo
            .adjust_stock(
                &mut *tx,
                request.item_id,
                request.quantity,
                StockAdjustment::Subtract,
            )
            .await?;

        let updated = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        tx.commit().await?;

        self.activity_service
            .record(
                approver_id,
                &format!(
                    "Aprovou solicitação de {} (Quantidade: {}) - Estoque reduzido",
                    item.name, request.quantity
                ),
                "APPROVED",
            )
            .await;

        Ok(updated)
    }

    /// Rejeita uma solicitação pendente. Nunca toca no estoque.
    pub async fn reject(&self, request_id: Uuid, actor_id: Uuid) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition {
                current: request.status,
            });
        }

        self.request_repo
            .set_status(&mut *tx, request_id, RequestStatus::Rejected)
            .await?;

        let updated = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        tx.commit().await?;

        self.activity_service
            .record(
                actor_id,
                &format!(
                    "Rejeitou solicitação de {} (Quantidade: {})",
                    request.item_name.as_deref().unwrap_or("item"),
                    request.quantity
                ),
                "REJECTED",
            )
            .await;

        Ok(updated)
    }

    // ---
    // CANCELAMENTO (médico dono, ou administrativo)
    // ---

    /// Cancela uma solicitação pendente. Estado terminal próprio, distinto
    /// de REJECTED; cancelar de novo é no-op; nunca toca no estoque.
    pub async fn cancel(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<Request, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        // Só o médico dono cancela; admin cancela administrativamente.
        if actor_role != Role::Admin && request.doctor_id != actor_id {
            return Err(AppError::AccessDenied("requests:cancel"));
        }

        if request.status == RequestStatus::Cancelled {
            return Ok(request);
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition {
                current: request.status,
            });
        }

        self.request_repo
            .set_status(&mut *tx, request_id, RequestStatus::Cancelled)
            .await?;

        let updated = self
            .request_repo
            .find_by_id(&mut *tx, request_id)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        tx.commit().await?;

        self.activity_service
            .record(
                actor_id,
                &format!(
                    "Cancelou solicitação de {} (Quantidade: {})",
                    request.item_name.as_deref().unwrap_or("item"),
                    request.quantity
                ),
                "CANCELLED",
            )
            .await;

        Ok(updated)
    }

    // ---
    // Listagens
    // ---

    /// Lista para a tela do farmacêutico: busca livre primeiro, filtro de
    /// status refinando o resultado.
    pub async fn list(
        &self,
        status: Option<RequestStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Request>, AppError> {
        match search {
            Some(term) if !term.trim().is_empty() => {
                let mut results = self.request_repo.search(term.trim()).await?;
                if let Some(status) = status {
                    results.retain(|r| r.status == status);
                }
                Ok(results)
            }
            _ => match status {
                Some(status) => self.request_repo.get_by_status(status).await,
                None => self.request_repo.get_all().await,
            },
        }
    }

    pub async fn history_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Request>, AppError> {
        self.request_repo.get_by_doctor(doctor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{seed_item, seed_user, test_state};

    const PATIENT_ID: &str = "PAC-0042";
    const PATIENT_NAME: &str = "João da Silva";

    #[tokio::test]
    async fn item_comum_auto_aprova_e_baixa_o_estoque() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Amoxicilina 500mg", 50, 10, false).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 20, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.priority, RequestPriority::Normal);

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 30);
    }

    #[tokio::test]
    async fn item_comum_sem_saldo_nao_persiste_nada() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Amoxicilina 500mg", 50, 10, false).await;

        // Cenário do fluxo completo: 20 saem, sobram 30; pedir 40 falha.
        state
            .request_service
            .create_request(doctor, item_id, 20, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        let err = state
            .request_service
            .create_request(doctor, item_id, 40, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock {
                available,
                requested,
            } => {
                assert_eq!(available, 30);
                assert_eq!(requested, 40);
            }
            other => panic!("erro inesperado: {other:?}"),
        }

        // Nada persistiu: nem solicitação nova, nem mudança de saldo.
        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 30);
        let history = state.request_service.history_for_doctor(doctor).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn quantidade_igual_ao_saldo_zera_o_estoque() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Amoxicilina 500mg", 20, 10, false).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 20, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Approved);
        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 0);
    }

    #[tokio::test]
    async fn item_controlado_entra_pendente_sem_tocar_o_estoque() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        // Mesmo acima do saldo: controlado nunca baixa estoque na criação.
        let request = state
            .request_service
            .create_request(doctor, item_id, 8, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.priority, RequestPriority::High);
        assert!(request.approved_at.is_none());

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 5);
    }

    #[tokio::test]
    async fn validacoes_de_entrada_do_engine() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Amoxicilina 500mg", 50, 10, false).await;

        let err = state
            .request_service
            .create_request(doctor, item_id, 0, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity));

        let err = state
            .request_service
            .create_request(doctor, item_id, -3, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity));

        let err = state
            .request_service
            .create_request(doctor, item_id, 5, "  ", PATIENT_NAME, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("patientId")));

        let err = state
            .request_service
            .create_request(doctor, item_id, 5, PATIENT_ID, "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("patientName")));

        let err = state
            .request_service
            .create_request(doctor, Uuid::new_v4(), 5, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound));

        // Nada disso virou linha no banco.
        let history = state.request_service.history_for_doctor(doctor).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn aprovar_pendente_baixa_estoque_e_carimba_aprovador() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        let approved = state
            .request_service
            .approve(request.id, pharmacist)
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("Dr. Lee"));
        assert!(approved.approved_at.is_some());

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 3);
    }

    #[tokio::test]
    async fn reaprovar_e_noop_e_nao_baixa_estoque_de_novo() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        state.request_service.approve(request.id, pharmacist).await.unwrap();
        let again = state
            .request_service
            .approve(request.id, pharmacist)
            .await
            .unwrap();

        assert_eq!(again.status, RequestStatus::Approved);
        // Exatamente UMA baixa atribuível à solicitação.
        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 3);
    }

    #[tokio::test]
    async fn aprovar_sem_saldo_mantem_pendente_e_o_estoque() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 1, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        let err = state
            .request_service
            .approve(request.id, pharmacist)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                available: 1,
                requested: 2
            }
        ));

        let reloaded = state
            .request_service
            .list(Some(RequestStatus::Pending), None)
            .await
            .unwrap();
        assert_eq!(reloaded.len(), 1);

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 1);
    }

    #[tokio::test]
    async fn rejeitar_so_funciona_em_pendente_e_nao_toca_estoque() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        let rejected = state
            .request_service
            .reject(request.id, pharmacist)
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 5);

        // Rejeitar de novo: erro explícito, não mutação silenciosa.
        let err = state
            .request_service
            .reject(request.id, pharmacist)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                current: RequestStatus::Rejected
            }
        ));

        // Aprovar uma rejeitada também é transição inválida.
        let err = state
            .request_service
            .approve(request.id, pharmacist)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                current: RequestStatus::Rejected
            }
        ));
    }

    #[tokio::test]
    async fn cancelamento_guardado_e_idempotente() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let other_doctor = seed_user(&state.db_pool, "Dra. Lima", Role::Doctor).await;
        let admin = seed_user(&state.db_pool, "Alice Admin", Role::Admin).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        // Outro médico não cancela o que não é dele.
        let err = state
            .request_service
            .cancel(request.id, other_doctor, Role::Doctor)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));

        // O dono cancela; estoque intacto.
        let cancelled = state
            .request_service
            .cancel(request.id, doctor, Role::Doctor)
            .await
            .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
        let item = state.inventory_service.find_item(item_id).await.unwrap();
        assert_eq!(item.stock, 5);

        // Cancelar de novo: no-op bem-sucedido.
        let again = state
            .request_service
            .cancel(request.id, doctor, Role::Doctor)
            .await
            .unwrap();
        assert_eq!(again.status, RequestStatus::Cancelled);

        // Admin pode cancelar a pendente de qualquer médico.
        let second = state
            .request_service
            .create_request(doctor, item_id, 1, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();
        let cancelled = state
            .request_service
            .cancel(second.id, admin, Role::Admin)
            .await
            .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);

        // Aprovada é terminal: cancelamento vira transição inválida.
        let third = state
            .request_service
            .create_request(doctor, item_id, 1, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        state.request_service.approve(third.id, pharmacist).await.unwrap();
        let err = state
            .request_service
            .cancel(third.id, doctor, Role::Doctor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                current: RequestStatus::Approved
            }
        ));
    }

    #[tokio::test]
    async fn transicoes_registram_atividade() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let item_id = seed_item(&state.db_pool, "Morfina 10mg", 5, 2, true).await;

        let request = state
            .request_service
            .create_request(doctor, item_id, 2, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();
        state.request_service.approve(request.id, pharmacist).await.unwrap();

        let logs = state.activity_service.list().await.unwrap();
        assert_eq!(logs.len(), 2);
        // Mais recente primeiro.
        assert!(logs[0].description.starts_with("Aprovou"));
        assert!(logs[1].description.starts_with("Solicitou"));
        assert_eq!(logs[0].user_name.as_deref(), Some("Dr. Lee"));
    }

    #[tokio::test]
    async fn criacao_fora_do_padrao_gera_achado_consultivo() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let item_id = seed_item(&state.db_pool, "Omeprazol 20mg", 1000, 10, false).await;

        // Três solicitações comportadas e uma muito acima do histórico.
        for _ in 0..3 {
            state
                .request_service
                .create_request(doctor, item_id, 10, PATIENT_ID, PATIENT_NAME, None)
                .await
                .unwrap();
        }
        let outlier = state
            .request_service
            .create_request(doctor, item_id, 50, PATIENT_ID, PATIENT_NAME, None)
            .await
            .unwrap();

        // A criação passou (consultivo não bloqueia)...
        assert_eq!(outlier.status, RequestStatus::Approved);

        // ...e o achado ficou registrado para a tela do admin.
        let findings = state.analytics_service.list_anomalies(false).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].request_id, Some(outlier.id));
        assert_eq!(findings[0].anomaly_type, "unusual_quantity");

        // Resolver tira da fila padrão.
        state
            .analytics_service
            .resolve_anomaly(findings[0].id)
            .await
            .unwrap();
        assert!(state
            .analytics_service
            .list_anomalies(false)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            state
                .analytics_service
                .list_anomalies(true)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn busca_com_filtro_de_status() {
        let state = test_state().await;
        let doctor = seed_user(&state.db_pool, "Dr. Souza", Role::Doctor).await;
        let pharmacist = seed_user(&state.db_pool, "Dr. Lee", Role::Pharmacist).await;
        let controlled = seed_item(&state.db_pool, "Morfina 10mg", 50, 2, true).await;

        let first = state
            .request_service
            .create_request(doctor, controlled, 2, "PAC-1", "Maria Souza", None)
            .await
            .unwrap();
        state
            .request_service
            .create_request(doctor, controlled, 3, "PAC-2", "Maria Oliveira", None)
            .await
            .unwrap();
        state.request_service.approve(first.id, pharmacist).await.unwrap();

        let all_marias = state
            .request_service
            .list(None, Some("Maria"))
            .await
            .unwrap();
        assert_eq!(all_marias.len(), 2);

        let pending_marias = state
            .request_service
            .list(Some(RequestStatus::Pending), Some("Maria"))
            .await
            .unwrap();
        assert_eq!(pending_marias.len(), 1);
        assert_eq!(pending_marias[0].patient_name, "Maria Oliveira");

        let pending = state
            .request_service
            .list(Some(RequestStatus::Pending), None)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }
}
