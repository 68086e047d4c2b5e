use askama::Template;
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    config::Settings,
    models::Result,
    scoring::{Leaderboard, TierClassifier},
    sheet::RecordSource,
    web::pages::{AboutPage, ErrorPage, HomePage, SheetPage, TierRow, TopCollectorsPage},
};

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

/// A rendered response, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
}

impl Reply {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: HTML,
            body,
            location: None,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: TEXT,
            body: body.into(),
            location: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            content_type: TEXT,
            body: String::new(),
            location: Some(location.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    TopCollectors,
    Submit,
    About,
    Sheet,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        match path {
            "" | "/" => Some(Route::Home),
            "/top-collectors" => Some(Route::TopCollectors),
            "/submit" => Some(Route::Submit),
            "/about" => Some(Route::About),
            "/sheet" => Some(Route::Sheet),
            _ => None,
        }
    }
}

/// Maps requests to pages. The leaderboard is rebuilt from the record
/// source on every request.
#[derive(Clone)]
pub struct Router {
    settings: Arc<Settings>,
    classifier: Arc<TierClassifier>,
    source: Arc<dyn RecordSource>,
}

impl Router {
    pub fn new(settings: Arc<Settings>, classifier: Arc<TierClassifier>, source: Arc<dyn RecordSource>) -> Self {
        Self {
            settings,
            classifier,
            source,
        }
    }

    pub fn handle(&self, method: &str, url: &str) -> Reply {
        if !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD") {
            return self.error_page(405, "Method Not Allowed", format!("{} is not supported", method));
        }

        let Some(route) = Route::from_path(url) else {
            return self.error_page(404, "Not Found", format!("Nothing lives at {}", url));
        };
        debug!("{} {} -> {:?}", method, url, route);

        let rendered = match route {
            Route::Home => self.home(),
            Route::TopCollectors => self.top_collectors(),
            Route::Submit => return Reply::redirect(&self.settings.server.submit_url),
            Route::About => self.about(),
            Route::Sheet => {
                return match self.sheet() {
                    Ok(body) => Reply::html(body),
                    Err(e) => {
                        error!("Failed to render sheet from {}: {}", self.source.describe(), e);
                        Reply::text(500, format!("Error loading sheet: {}", e))
                    }
                };
            }
        };

        match rendered {
            Ok(body) => Reply::html(body),
            Err(e) => {
                error!("Failed to render {:?} from {}: {}", route, self.source.describe(), e);
                self.error_page(500, "Internal Server Error", "The leaderboard could not be loaded.".to_string())
            }
        }
    }

    fn leaderboard(&self) -> Result<Leaderboard> {
        let records = self.source.load_records()?;
        Ok(Leaderboard::build(records, &self.classifier))
    }

    fn app_name(&self) -> &str {
        &self.settings.app.name
    }

    fn home(&self) -> Result<String> {
        let board = self.leaderboard()?;
        let page = HomePage {
            app_name: self.app_name(),
            top: board.top(self.settings.server.top_count),
            total: board.len(),
            generated_at: board.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        };
        Ok(page.render()?)
    }

    fn top_collectors(&self) -> Result<String> {
        let board = self.leaderboard()?;
        let page = TopCollectorsPage {
            app_name: self.app_name(),
            collectors: &board.collectors,
            generated_at: board.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        };
        Ok(page.render()?)
    }

    fn about(&self) -> Result<String> {
        let page = AboutPage {
            app_name: self.app_name(),
            tiers: TierRow::from_settings(&self.settings.tiers),
        };
        Ok(page.render()?)
    }

    fn sheet(&self) -> Result<String> {
        let page = SheetPage {
            app_name: self.app_name(),
            sheet: self.source.load_sheet()?,
        };
        Ok(page.render()?)
    }

    fn error_page(&self, status: u16, title: &str, message: String) -> Reply {
        let page = ErrorPage {
            app_name: self.app_name(),
            status,
            title,
            message,
        };
        match page.render() {
            Ok(body) => Reply {
                status,
                content_type: HTML,
                body,
                location: None,
            },
            Err(e) => {
                error!("Failed to render error page: {}", e);
                Reply::text(status, title.to_string())
            }
        }
    }
}
