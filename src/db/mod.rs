// src/db/mod.rs

pub mod catalog_repo;
pub mod domain_repo;
pub mod order_repo;
pub mod user_repo;

pub use catalog_repo::CatalogRepository;
pub use domain_repo::DomainRepository;
pub use order_repo::OrderRepository;
pub use user_repo::UserRepository;

use uuid::Uuid;

// ---
// TenantScope: o escopo declarado de TODA consulta a entidades de tenant.
// ---
// Cada método de repositório sobre produtos/categorias/pedidos exige um
// TenantScope como parâmetro. Não existe consulta "sem escopo declarado":
// ou a chamada filtra por um admin, ou declara explicitamente a visão
// global (superadmin). Esquecer o filtro deixa de ser possível — o código
// nem compila sem escolher um dos dois.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Visão de um tenant: tudo filtrado por `admin_id`.
    Scoped(Uuid),
    /// Visão global (superadmin): sem filtro de tenant.
    Unscoped,
}

impl TenantScope {
    /// Um registro pertencente a `owner` é visível neste escopo?
    pub fn permits(&self, owner: Uuid) -> bool {
        match self {
            TenantScope::Scoped(admin_id) => *admin_id == owner,
            TenantScope::Unscoped => true,
        }
    }

    /// O admin dono do escopo, quando há um.
    pub fn admin_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::Scoped(admin_id) => Some(*admin_id),
            TenantScope::Unscoped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escopo_de_um_admin_nao_enxerga_registros_de_outro() {
        let admin_a = Uuid::new_v4();
        let admin_b = Uuid::new_v4();

        let escopo_b = TenantScope::Scoped(admin_b);
        // Um produto criado pelo admin A nunca aparece no escopo do admin B
        assert!(!escopo_b.permits(admin_a));
        assert!(escopo_b.permits(admin_b));
    }

    #[test]
    fn visao_global_enxerga_tudo() {
        assert!(TenantScope::Unscoped.permits(Uuid::new_v4()));
        assert_eq!(TenantScope::Unscoped.admin_id(), None);
    }
}
