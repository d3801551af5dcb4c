//! Collection pagination policy.

use apigen_metadata::{Operation, PaginationType};

use crate::config::PaginationConfig;

/// Global pagination options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page_parameter_name: String,
    pub items_per_page_parameter_name: String,
    pub client_items_per_page: bool,
    pub items_per_page: usize,
}

/// Decides how collection operations are paginated.
pub trait PaginationPolicy: Send + Sync {
    fn is_enabled(&self, operation: &Operation) -> bool;

    fn pagination_type(&self, operation: &Operation) -> PaginationType;

    fn options(&self) -> PaginationOptions;

    /// Whether clients may choose the page size of an operation. Defaults
    /// to the global option.
    fn client_items_per_page(&self, _operation: &Operation) -> bool {
        self.options().client_items_per_page
    }
}

/// [`PaginationPolicy`] from configuration, honouring per-operation
/// overrides.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    config: PaginationConfig,
}

impl Pagination {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }
}

impl PaginationPolicy for Pagination {
    fn is_enabled(&self, operation: &Operation) -> bool {
        operation.pagination_enabled.unwrap_or(self.config.enabled)
    }

    fn pagination_type(&self, operation: &Operation) -> PaginationType {
        operation
            .pagination_type
            .unwrap_or(self.config.pagination_type)
    }

    fn options(&self) -> PaginationOptions {
        PaginationOptions {
            page_parameter_name: self.config.page_parameter_name.clone(),
            items_per_page_parameter_name: self.config.items_per_page_parameter_name.clone(),
            client_items_per_page: self.config.client_items_per_page,
            items_per_page: self.config.items_per_page,
        }
    }

    fn client_items_per_page(&self, operation: &Operation) -> bool {
        operation
            .pagination_client_items_per_page
            .unwrap_or(self.config.client_items_per_page)
    }
}
