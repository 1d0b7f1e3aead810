use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

/// Sign-in form. `error` is shown above the form after a failed attempt.
pub fn login_page(error: Option<&str>, email: &str) -> Markup {
    desktop_layout(
        "Connexion",
        None,
        html! {
            main class="container narrow" {
                (card("Connexion", html! {
                    @if let Some(msg) = error {
                        p class="toast toast-error" role="alert" { (msg) }
                    }
                    form method="post" action="/login" style="display: grid; gap: 12px;" {
                        label for="email" { "Email" }
                        input type="email" id="email" name="email" value=(email)
                            autocomplete="email" required;
                        label for="password" { "Mot de passe" }
                        input type="password" id="password" name="password"
                            autocomplete="current-password" required;
                        button type="submit" class="btn" { "Se connecter" }
                    }
                }))
            }
        },
    )
}
