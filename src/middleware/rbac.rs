// src/middleware/rbac.rs

use crate::{common::error::AppError, middleware::auth::CurrentUser, models::auth::Role};

// Controle de acesso por papel: um mapeamento plano de papel para o
// conjunto de ações permitidas. Sem hierarquia de classes, sem banco:
// os papéis do hospital são fixos e conhecidos em tempo de compilação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    InventoryRead,
    InventoryWrite,
    RequestCreate,
    RequestRead,
    RequestReadOwn,
    RequestApprove,
    RequestCancel,
    AnalyticsRead,
    AnalyticsTrain,
    AnomalyManage,
    ActivityRead,
}

impl Permission {
    pub fn slug(&self) -> &'static str {
        match self {
            Permission::InventoryRead => "inventory:read",
            Permission::InventoryWrite => "inventory:write",
            Permission::RequestCreate => "requests:create",
            Permission::RequestRead => "requests:read",
            Permission::RequestReadOwn => "requests:read-own",
            Permission::RequestApprove => "requests:approve",
            Permission::RequestCancel => "requests:cancel",
            Permission::AnalyticsRead => "analytics:read",
            Permission::AnalyticsTrain => "analytics:train",
            Permission::AnomalyManage => "anomalies:manage",
            Permission::ActivityRead => "activity:read",
        }
    }
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            // Médico: solicita itens, acompanha e cancela as próprias
            // solicitações enquanto pendentes.
            Role::Doctor => &[
                Permission::InventoryRead,
                Permission::RequestCreate,
                Permission::RequestReadOwn,
                Permission::RequestCancel,
            ],
            // Farmacêutico: gerencia estoque e decide a fila de aprovação;
            // consome as previsões de demanda para repor.
            Role::Pharmacist => &[
                Permission::InventoryRead,
                Permission::InventoryWrite,
                Permission::RequestRead,
                Permission::RequestApprove,
                Permission::AnalyticsRead,
            ],
            // Admin: relatórios, anomalias, re-treino e cancelamento
            // administrativo.
            Role::Admin => &[
                Permission::InventoryRead,
                Permission::RequestRead,
                Permission::RequestCancel,
                Permission::AnalyticsRead,
                Permission::AnalyticsTrain,
                Permission::AnomalyManage,
                Permission::ActivityRead,
            ],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl CurrentUser {
    /// Guardião usado no começo de cada handler.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.can(permission) {
            Ok(())
        } else {
            Err(AppError::AccessDenied(permission.slug()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn medico_cria_mas_nao_aprova() {
        assert!(Role::Doctor.can(Permission::RequestCreate));
        assert!(!Role::Doctor.can(Permission::RequestApprove));
        assert!(!Role::Doctor.can(Permission::InventoryWrite));
    }

    #[test]
    fn farmaceutico_decide_a_fila_mas_nao_cria() {
        assert!(Role::Pharmacist.can(Permission::RequestApprove));
        assert!(Role::Pharmacist.can(Permission::InventoryWrite));
        assert!(!Role::Pharmacist.can(Permission::RequestCreate));
        assert!(!Role::Pharmacist.can(Permission::AnomalyManage));
    }

    #[test]
    fn admin_gerencia_anomalias_e_cancela() {
        assert!(Role::Admin.can(Permission::AnomalyManage));
        assert!(Role::Admin.can(Permission::RequestCancel));
        assert!(Role::Admin.can(Permission::AnalyticsTrain));
        assert!(!Role::Admin.can(Permission::RequestApprove));
    }

    #[test]
    fn require_devolve_access_denied_com_o_slug() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            role: Role::Doctor,
        };
        let err = user.require(Permission::RequestApprove).unwrap_err();
        assert!(matches!(err, AppError::AccessDenied("requests:approve")));
    }
}
