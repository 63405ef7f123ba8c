use std::collections::HashSet;
use std::fmt;

use crate::error::CatalogError;
use crate::util::urljoin;

/// Default base URL of the BioPortal administration API.
pub const DEFAULT_BASE_URL: &str = "https://BioPortal.salud.gov.pr/api/administration";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Human-readable dataset name, used as the lookup key.
    pub name: String,
    /// Endpoint path relative to the catalog base URL, or an absolute URL.
    pub path: String,
    /// Why the entry cannot be downloaded, if it can't.
    pub disabled: Option<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            disabled: None,
        }
    }

    pub fn disabled(
        name: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            disabled: Some(reason.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }
}

/// Ordered, immutable mapping of dataset names to endpoints.
#[derive(Debug, Clone)]
pub struct Catalog {
    base_url: String,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(
        base_url: impl Into<String>,
        entries: Vec<CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for e in &entries {
            if !seen.insert(e.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: e.name.clone(),
                });
            }
        }

        Ok(Self {
            base_url: base_url.into(),
            entries,
        })
    }

    /// The public BioPortal reports, rooted at `base_url`.
    pub fn bioportal(base_url: &str) -> Self {
        const BROTLI_DEFECT: &str = "server returns an incomplete Brotli stream";
        const NEEDS_JS: &str = "endpoint answers with an HTML page that requires JavaScript";

        let entries = vec![
            CatalogEntry::disabled(
                "Cantidades totales de pruebas reportadas",
                "reports/total",
                BROTLI_DEFECT,
            ),
            CatalogEntry::new(
                "Pruebas unicas con informacion minima",
                "reports/minimal-info-unique-tests",
            ),
            CatalogEntry::new(
                "Pruebas unicas con ID de paciente y fechas en tiempo local de Puerto Rico",
                "reports/orders/minimal-info",
            ),
            CatalogEntry::new(
                "Pruebas unicas con ID de paciente y fechas en tiempo internacional UTC",
                "reports/orders/basic",
            ),
            CatalogEntry::disabled(
                "Pruebas diarias para grafica de dashboard de Salud",
                "orders/dashboard-daily-testing",
                NEEDS_JS,
            ),
            CatalogEntry::new(
                "Pruebas por fecha de coleccion",
                "reports/tests-by-collected-date",
            ),
            CatalogEntry::new(
                "Pruebas por fecha de reporte",
                "reports/tests-by-reported-date",
            ),
            CatalogEntry::new(
                "Pruebas por fecha de coleccion y entidad",
                "reports/tests-by-collected-date-and-entity",
            ),
            CatalogEntry::new(
                "Total de TDF por fecha reportada de llegada",
                "reports/travels/total-forms-by-reported-arrival-date",
            ),
            CatalogEntry::disabled(
                "Total de TDF por municipio",
                "travels/total-forms-by-municipalities",
                NEEDS_JS,
            ),
            CatalogEntry::new(
                "Casos por fecha de coleccion",
                "reports/cases/grouped-by-collected-date",
            ),
            CatalogEntry::new(
                "Casos por fecha de creacion en sistema",
                "reports/cases/dashboard-daily",
            ),
            CatalogEntry::new(
                "Casos por grupo de edad",
                "reports/cases/dashboard-age-group",
            ),
            CatalogEntry::new("Casos por ciudad", "reports/cases/dashboard-city"),
            CatalogEntry::new("Casos por region", "reports/cases/dashboard-region"),
            CatalogEntry::new(
                "Resumen de Escuelas Publicas y Privadas",
                "reports/education/general-summary",
            ),
        ];

        Self {
            base_url: base_url.to_string(),
            entries,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All entries, disabled ones included, in definition order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Names of the downloadable datasets, in definition order.
    pub fn names(&self) -> Vec<&str> {
        self.enabled().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.enabled().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a dataset name to the absolute URL of its endpoint.
    pub fn resolve(&self, name: &str) -> Result<String, CatalogError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CatalogError::UnknownDataset {
                name: name.to_string(),
            })?;

        if let Some(reason) = &entry.disabled {
            return Err(CatalogError::DatasetDisabled {
                name: name.to_string(),
                reason: reason.clone(),
            });
        }

        Ok(urljoin(&self.base_url, &entry.path))
    }

    fn enabled(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_enabled())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::bioportal(DEFAULT_BASE_URL)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available datasets:")?;
        for (i, e) in self.enabled().enumerate() {
            writeln!(f, " {:>2}   '{}'", i + 1, e.name)?;
        }
        Ok(())
    }
}
