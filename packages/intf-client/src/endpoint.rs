//! Endpoint catalogue for the three tenant-scoped API variants.

use std::fmt;
use std::str::FromStr;

use crate::Error;

pub const LOGIC_HOST: &str = "https://logic.interfolio.com";
pub const FAR_HOST: &str = "https://faculty180.interfolio.com/api.php";

/// Named API variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum System {
    /// Review, promotion and tenure.
    Rpt,
    /// Faculty search.
    Fs,
    /// Faculty activity reporting (Faculty180).
    Far,
}

impl System {
    pub fn as_str(&self) -> &'static str {
        match self {
            System::Rpt => "RPT",
            System::Fs => "FS",
            System::Far => "FAR",
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for System {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RPT" => Ok(System::Rpt),
            "FS" => Ok(System::Fs),
            "FAR" => Ok(System::Far),
            other => Err(Error::Config(format!(
                "Unknown system '{other}'. Use RPT, FS, or FAR."
            ))),
        }
    }
}

/// How a page is addressed in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// `?limit={limit}&page={page}`
    Page,
    /// `?limit={limit}&offset={(page - 1) * limit}`
    Offset,
}

/// Host plus base path of one listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub system: System,
    pub base_url: String,
    pub path: String,
    pub paging: Paging,
    /// FAR requests carry `INTF-DatabaseID`.
    pub database_header: bool,
}

impl Endpoint {
    /// User listing for a variant. RPT and FS are scoped by tenant id.
    pub fn users(system: System, tenant_id: Option<&str>) -> Result<Self, Error> {
        let tenant = || {
            tenant_id
                .filter(|t| !t.is_empty())
                .ok_or_else(|| Error::Config(format!("TENANT_1_ID is required for {system}")))
        };
        let endpoint = match system {
            System::Rpt => {
                let t = tenant()?;
                Self::logic(system, format!("/byc/core/tenure/{t}/institutions/{t}/users/search"))
            }
            System::Fs => {
                let t = tenant()?;
                Self::logic(system, format!("/byc/core/search/{t}/institutions/{t}/users/search"))
            }
            System::Far => Self::far("/users".into(), Paging::Page),
        };
        Ok(endpoint)
    }

    /// FAR activity data, grouped by section. Addressed by offset.
    pub fn far_activities() -> Self {
        Self::far("/userdata".into(), Paging::Offset)
    }

    fn logic(system: System, path: String) -> Self {
        Self {
            system,
            base_url: LOGIC_HOST.into(),
            path,
            paging: Paging::Page,
            database_header: false,
        }
    }

    fn far(path: String, paging: Paging) -> Self {
        Self {
            system: System::Far,
            base_url: FAR_HOST.into(),
            path,
            paging,
            database_header: true,
        }
    }

    /// Point the endpoint at another host (proxy, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Path and query for a 1-based page. This exact string is both signed and sent.
    pub fn page_path(&self, page: u32, limit: usize) -> String {
        match self.paging {
            Paging::Page => format!("{}?limit={limit}&page={page}", self.path),
            Paging::Offset => {
                let offset = (page.saturating_sub(1) as usize) * limit;
                format!("{}?limit={limit}&offset={offset}", self.path)
            }
        }
    }

    /// Absolute URL for a signed path.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }
}

/// Path of a single FAR user profile.
pub fn far_user_path(user_id: &str) -> String {
    format!("/users/{user_id}")
}
