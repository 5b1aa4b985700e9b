//! Dashboard rendering
//!
//! A [`DashboardView`] is built from a live session before anything is
//! rendered, so every section has its data by construction. Rendering is
//! then plain templating over the view with all text HTML-escaped.

use shared_types::{KeyClause, RiskFlag, RiskLevel};
use v_htmlescape::escape;

use crate::bridge::AnalysisSession;
use crate::chat::{ChatMessage, ChatRole, SUGGESTED_QUESTIONS};
use crate::layout::{self, INDEX_PAGE};

pub const MISSING_STATE_HEADING: &str = "Error: No analysis data found.";
pub const MISSING_STATE_LINK_TEXT: &str = "Please go back and try again.";
pub const NO_RISKS_TEXT: &str = "No significant risks were found in this document.";
pub const NO_CLAUSES_TEXT: &str = "No key clauses were identified.";

/// Route the chat form posts to
pub const CHAT_FORM_ACTION: &str = "/chat";

/// CSS class, icon and tooltip for a risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskStyle {
    pub css_class: &'static str,
    pub icon: &'static str,
    pub tooltip: &'static str,
}

impl RiskStyle {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Red => RiskStyle {
                css_class: "risk-red",
                icon: "alert-triangle",
                tooltip: "High Risk",
            },
            RiskLevel::Yellow => RiskStyle {
                css_class: "risk-yellow",
                icon: "alert-circle",
                tooltip: "Medium Risk",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskEntry {
    pub title: String,
    pub explanation: String,
    pub style: RiskStyle,
}

impl From<&RiskFlag> for RiskEntry {
    fn from(flag: &RiskFlag) -> Self {
        Self {
            title: flag.title.clone(),
            explanation: flag.explanation.clone(),
            style: RiskStyle::for_level(flag.level),
        }
    }
}

/// One collapsible clause entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseEntry {
    pub anchor: String,
    pub title: String,
    pub original_text: String,
    pub simplified_text: String,
}

impl ClauseEntry {
    fn new(index: usize, clause: &KeyClause) -> Self {
        Self {
            anchor: format!("clause-{}", index + 1),
            title: clause.title.clone(),
            original_text: clause.original_text.clone(),
            simplified_text: clause.simplified_text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub session_id: String,
    pub document_name: String,
    pub summary: String,
    pub risks: Vec<RiskEntry>,
    pub clauses: Vec<ClauseEntry>,
    pub transcript: Vec<ChatMessage>,
}

impl DashboardView {
    pub fn from_session(session: &AnalysisSession) -> Self {
        Self {
            session_id: session.id.to_string(),
            document_name: session.document_name.clone(),
            summary: session.result.summary.clone(),
            risks: session.result.risk_flags.iter().map(RiskEntry::from).collect(),
            clauses: session
                .result
                .key_clauses
                .iter()
                .enumerate()
                .map(|(i, c)| ClauseEntry::new(i, c))
                .collect(),
            transcript: session.transcript.clone(),
        }
    }

    pub fn render(&self) -> String {
        let body = format!(
            r##"<div class="dashboard">
    <aside class="sidebar">
        <p class="document-name">{name}</p>
        <nav>
            <a class="sidebar-nav-item" href="#summary">Summary</a>
            <a class="sidebar-nav-item" href="#risks">Risk Flags</a>
            <a class="sidebar-nav-item" href="#clauses">Key Clauses</a>
            <a class="sidebar-nav-item" href="#chat">Ask a Question</a>
        </nav>
        <a href="/{index}">Analyze another document</a>
    </aside>
    <main>
        <section id="summary" class="content-section">
            <h2>Summary</h2>
            <p id="summary-text" class="summary-text">{summary}</p>
        </section>
        <section id="risks" class="content-section">
            <h2>Risk Flags</h2>
            <div id="risk-flags-container" class="risk-list">
{risks}
            </div>
        </section>
        <section id="clauses" class="content-section">
            <h2>Key Clauses</h2>
            <div id="key-clauses-container" class="clauses-accordion">
{clauses}
            </div>
        </section>
{chat}
    </main>
</div>"##,
            name = escape(&self.document_name),
            index = INDEX_PAGE,
            summary = escape(&self.summary),
            risks = self.render_risks(),
            clauses = self.render_clauses(),
            chat = self.render_chat(),
        );

        layout::page(&format!("Analysis of {}", self.document_name), &body)
    }

    fn render_risks(&self) -> String {
        if self.risks.is_empty() {
            return format!("                <p class=\"no-risks\">{}</p>", NO_RISKS_TEXT);
        }

        self.risks
            .iter()
            .map(|risk| {
                format!(
                    r#"                <div class="risk-item {class}">
                    <div class="risk-indicator" data-tooltip="{tooltip}"><i data-lucide="{icon}"></i></div>
                    <div class="risk-content">
                        <h4 class="risk-title">{title}</h4>
                        <p class="risk-description">{explanation}</p>
                    </div>
                </div>"#,
                    class = risk.style.css_class,
                    tooltip = risk.style.tooltip,
                    icon = risk.style.icon,
                    title = escape(&risk.title),
                    explanation = escape(&risk.explanation),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_clauses(&self) -> String {
        if self.clauses.is_empty() {
            return format!("                <p class=\"no-clauses\">{}</p>", NO_CLAUSES_TEXT);
        }

        self.clauses
            .iter()
            .map(|clause| {
                format!(
                    r#"                <details class="accordion-item" id="{anchor}">
                    <summary class="accordion-trigger"><span class="accordion-title">{title}</span><i data-lucide="chevron-down" class="accordion-icon"></i></summary>
                    <div class="accordion-content">
                        <div class="clause-comparison">
                            <div class="clause-original"><h5>Original Legal Text:</h5><p>"{original}"</p></div>
                            <div class="clause-explanation"><h5>Plain English:</h5><p>{simplified}</p></div>
                        </div>
                    </div>
                </details>"#,
                    anchor = clause.anchor,
                    title = escape(&clause.title),
                    original = escape(&clause.original_text),
                    simplified = escape(&clause.simplified_text),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_chat(&self) -> String {
        let messages = self
            .transcript
            .iter()
            .map(render_message)
            .collect::<Vec<_>>()
            .join("\n");

        let suggestions = SUGGESTED_QUESTIONS
            .iter()
            .map(|q| {
                format!(
                    r#"<button class="suggestion-btn" type="submit" name="suggestion" value="{q}">{q}</button>"#,
                    q = escape(q)
                )
            })
            .collect::<Vec<_>>()
            .join("");

        format!(
            r#"        <section id="chat" class="content-section">
            <h2>Ask a Question</h2>
            <div id="chatMessages" class="chat-messages">
{messages}
            </div>
            <form class="chat-form" method="post" action="{action}">
                <input type="hidden" name="session" value="{session}">
                <input id="chatInput" type="text" name="question" placeholder="Ask about your document..." autocomplete="off">
                <button id="sendBtn" type="submit">Send</button>
                <div class="chat-suggestions">{suggestions}</div>
            </form>
        </section>"#,
            action = CHAT_FORM_ACTION,
            session = escape(&self.session_id),
        )
    }
}

fn render_message(message: &ChatMessage) -> String {
    let (class, icon) = match message.role {
        ChatRole::User => ("chat-user", "user"),
        ChatRole::Assistant => ("chat-ai", "bot"),
    };
    format!(
        r#"                <div class="chat-message {class}"><div class="message-avatar"><i data-lucide="{icon}"></i></div><div class="message-content"><p>{text}</p></div></div>"#,
        text = escape(&message.text),
    )
}

/// Terminal page for a dashboard reached without analysis data
pub fn render_missing_state() -> String {
    let body = format!(
        r#"<h1>{}</h1><p><a href="/{}">{}</a></p>"#,
        MISSING_STATE_HEADING, INDEX_PAGE, MISSING_STATE_LINK_TEXT
    );
    layout::page("No analysis data", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::SessionStore;
    use pretty_assertions::assert_eq;
    use shared_types::AnalysisResult;

    fn lease_result() -> AnalysisResult {
        AnalysisResult {
            summary: "A standard 12-month residential rental agreement.".into(),
            risk_flags: vec![
                RiskFlag {
                    title: "Automatic Rent Increase Clause".into(),
                    explanation: "Clause 7.2 allows a 10% increase.".into(),
                    level: RiskLevel::Red,
                },
                RiskFlag {
                    title: "Full Maintenance Responsibility".into(),
                    explanation: "You pay for all appliance repairs.".into(),
                    level: RiskLevel::Yellow,
                },
            ],
            key_clauses: vec![KeyClause {
                title: "Security Deposit (Clause 4.1)".into(),
                original_text: "The tenant shall deposit a sum of Fifty Thousand Rupees.".into(),
                simplified_text: "You need to pay a security deposit.".into(),
            }],
        }
    }

    fn view_for(name: &str, result: AnalysisResult) -> DashboardView {
        let store = SessionStore::default();
        let id = store.create(name, "", result);
        DashboardView::from_session(&store.get(&id).unwrap())
    }

    #[test]
    fn test_view_model_for_lease() {
        let view = view_for("Lease.pdf", lease_result());

        assert_eq!(view.document_name, "Lease.pdf");
        assert_eq!(
            view.risks.iter().map(|r| r.style).collect::<Vec<_>>(),
            vec![
                RiskStyle::for_level(RiskLevel::Red),
                RiskStyle::for_level(RiskLevel::Yellow)
            ]
        );
        assert_eq!(view.clauses.len(), 1);
        assert_eq!(view.clauses[0].anchor, "clause-1");
    }

    #[test]
    fn test_renders_one_entry_per_risk_and_clause() {
        let html = view_for("Lease.pdf", lease_result()).render();

        assert_eq!(html.matches("class=\"risk-item ").count(), 2);
        assert_eq!(html.matches("risk-item risk-red").count(), 1);
        assert_eq!(html.matches("risk-item risk-yellow").count(), 1);
        assert!(html.contains("data-lucide=\"alert-triangle\""));
        assert!(html.contains("data-lucide=\"alert-circle\""));

        assert_eq!(html.matches("<details class=\"accordion-item\"").count(), 1);
        assert!(html.contains("The tenant shall deposit a sum of Fifty Thousand Rupees."));
        assert!(html.contains("You need to pay a security deposit."));
        assert!(html.contains("<p class=\"document-name\">Lease.pdf</p>"));
        assert!(!html.contains(NO_RISKS_TEXT));
    }

    #[test]
    fn test_no_risks_placeholder() {
        let mut result = lease_result();
        result.risk_flags.clear();
        result.key_clauses.clear();
        let html = view_for("Lease.pdf", result).render();

        assert!(html.contains(NO_RISKS_TEXT));
        assert!(html.contains(NO_CLAUSES_TEXT));
        assert_eq!(html.matches("class=\"risk-item ").count(), 0);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut result = lease_result();
        result.summary = "<script>alert(1)</script>".into();
        let html = view_for("<b>Lease</b>.pdf", result).render();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;Lease&lt;/b&gt;.pdf"));
    }

    #[test]
    fn test_transcript_is_rendered() {
        let mut view = view_for("Lease.pdf", lease_result());
        view.transcript = vec![ChatMessage::user("Can I have pets?"), ChatMessage::assistant("No.")];
        let html = view.render();

        assert!(html.contains("chat-message chat-user"));
        assert!(html.contains("chat-message chat-ai"));
        assert!(html.contains("Can I have pets?"));
        assert!(html.contains(&format!("name=\"session\" value=\"{}\"", view.session_id)));
    }

    #[test]
    fn test_missing_state_page_is_error_and_link_only() {
        let html = render_missing_state();

        assert!(html.contains(MISSING_STATE_HEADING));
        assert!(html.contains("<a href=\"/index.html\">Please go back and try again.</a>"));
        assert!(!html.contains("class=\"dashboard\""));
        assert!(!html.contains("risk-list"));
    }
}
