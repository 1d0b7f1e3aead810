use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn error_page(status: u16, message: &str) -> Markup {
    desktop_layout(
        &format!("Erreur {status}"),
        None,
        html! {
            main class="container narrow" {
                h1 { "Erreur " (status) }
                p { (message) }
                p { a href="/" { "← Retour à l'accueil" } }
            }
        },
    )
}
