use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_awareness_index)
        .service(view_awareness_page);
}

/// The fixed set of awareness pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AwarenessPage {
    Ragging,
    Harassment,
    Cyberbullying,
    Helplines,
}

impl AwarenessPage {
    pub const ALL: [AwarenessPage; 4] = [
        AwarenessPage::Ragging,
        AwarenessPage::Harassment,
        AwarenessPage::Cyberbullying,
        AwarenessPage::Helplines,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AwarenessPage::Ragging => "ragging",
            AwarenessPage::Harassment => "harassment",
            AwarenessPage::Cyberbullying => "cyberbullying",
            AwarenessPage::Helplines => "helplines",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AwarenessPage::Ragging => "Ragging",
            AwarenessPage::Harassment => "Harassment",
            AwarenessPage::Cyberbullying => "Cyberbullying",
            AwarenessPage::Helplines => "Helplines",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|page| page.slug() == slug)
    }
}

#[derive(Template)]
#[template(path = "awareness/index.html")]
struct AwarenessIndexTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    pages: &'static [AwarenessPage],
}

#[derive(Template)]
#[template(path = "awareness/page.html")]
struct AwarenessPageTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    page: AwarenessPage,
}

#[get("/awareness")]
pub async fn view_awareness_index(
    client: ClientCtx,
    session: actix_session::Session,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    Ok(AwarenessIndexTemplate {
        client,
        flashes: flash::take(&session),
        pages: &AwarenessPage::ALL,
    }
    .to_response())
}

#[get("/awareness/{page}")]
pub async fn view_awareness_page(
    client: ClientCtx,
    session: actix_session::Session,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    let page = AwarenessPage::from_slug(&path).ok_or_else(|| {
        log::debug!("Unknown awareness page requested: {:?}", path.as_str());
        error::ErrorNotFound("Page not found.")
    })?;

    Ok(AwarenessPageTemplate {
        client,
        flashes: flash::take(&session),
        page,
    }
    .to_response())
}

#[cfg(test)]
mod tests {
    use super::AwarenessPage;

    #[test]
    fn test_from_slug() {
        for page in AwarenessPage::ALL {
            assert_eq!(AwarenessPage::from_slug(page.slug()), Some(page));
        }
        assert_eq!(AwarenessPage::from_slug("Ragging"), None);
        assert_eq!(AwarenessPage::from_slug("../welcome"), None);
        assert_eq!(AwarenessPage::from_slug(""), None);
    }
}
