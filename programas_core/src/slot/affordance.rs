/// Why a slot points at the manual search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualReason {
    /// The lookup ran but no programa matched this subject.
    NotFound,
    /// The whole batch failed; nothing is known about this subject.
    LookupFailed,
}

/// Content of a programa slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// Default control the user can press to look the programa up.
    Fetch,
    Loading,
    Download { url: String },
    ManualSearch { url: String, reason: ManualReason },
}

impl Affordance {
    /// `Download` and `ManualSearch` end a run for their slot; `Fetch` and
    /// `Loading` do not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Affordance::Download { .. } | Affordance::ManualSearch { .. })
    }

    /// Short user-facing caption.
    pub fn caption(&self) -> &'static str {
        match self {
            Affordance::Fetch => "Buscar programa",
            Affordance::Loading => "Buscando programa...",
            Affordance::Download { .. } => "Descargar programa",
            Affordance::ManualSearch { reason: ManualReason::NotFound, .. } => {
                "Programa no encontrado automáticamente, por favor haga una búsqueda manual en este enlace"
            }
            Affordance::ManualSearch { reason: ManualReason::LookupFailed, .. } => {
                "Error al buscar programa, por favor haga una búsqueda manual en este enlace"
            }
        }
    }

    /// Target link, if this affordance is a link.
    pub fn url(&self) -> Option<&str> {
        match self {
            Affordance::Download { url } | Affordance::ManualSearch { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }

    /// Markup that replaces the slot container's content.
    pub fn to_html(&self) -> String {
        match self {
            Affordance::Fetch => format!(
                r#"<button type="button" class="btn btn-outline-primary w-100 download-programa-btn"><i class="bi bi-file-earmark-text"></i> {}</button>"#,
                self.caption()
            ),
            Affordance::Loading => format!(
                r#"<div class="programa-loading-indicator text-center"><div class="spinner-border spinner-border-sm" role="status"></div> {}</div>"#,
                self.caption()
            ),
            Affordance::Download { url } => format!(
                r#"<a href="{}" target="_blank" class="btn btn-success w-100 download-programa-btn"><i class="bi bi-file-earmark-arrow-down"></i> {}</a>"#,
                html_escape(url),
                self.caption()
            ),
            Affordance::ManualSearch { url, .. } => format!(
                r#"<a href="{}" target="_blank" class="btn btn-secondary w-100 text-wrap"><i class="bi bi-search"></i> {}</a>"#,
                html_escape(url),
                self.caption()
            ),
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
