use maud::{html, Markup, DOCTYPE};

const BASE_CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
header { display: flex; align-items: center; justify-content: space-between; padding: 12px 24px; background: #fff; border-bottom: 1px solid #e2e8f0; }
header nav { display: flex; gap: 8px; align-items: center; }
main.container { max-width: 1280px; margin: 0 auto; padding: 24px 16px; display: grid; gap: 24px; }
main.narrow { max-width: 420px; }
.card { background: #fff; border: 1px solid #e2e8f0; border-radius: 8px; padding: 16px; }
.grid-3 { display: grid; gap: 16px; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); }
.btn { padding: 6px 12px; border: 1px solid #cbd5e1; border-radius: 6px; background: #fff; cursor: pointer; text-decoration: none; color: inherit; font-size: 0.9rem; }
.btn-danger { color: #dc2626; border-color: transparent; background: transparent; }
.badge { display: inline-block; padding: 2px 8px; border-radius: 9999px; font-size: 0.75rem; border: 1px solid transparent; }
.badge-default { background: #2563eb; color: #fff; }
.badge-secondary { background: #e2e8f0; color: #0f172a; }
.badge-destructive { background: #dc2626; color: #fff; }
.badge-outline { border-color: #cbd5e1; color: #475569; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #f1f5f9; white-space: nowrap; }
.muted { color: #64748b; }
.toasts { position: fixed; top: 16px; right: 16px; display: grid; gap: 8px; z-index: 10; }
.toast { padding: 10px 14px; border-radius: 6px; box-shadow: 0 2px 6px rgba(0,0,0,.15); background: #fff; }
.toast-success { border-left: 4px solid #16a34a; }
.toast-error { border-left: 4px solid #dc2626; }
"#;

/// Page shell. `user` is the signed-in operator's email, if any.
pub fn desktop_layout(title: &str, user: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="fr" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (maud::PreEscaped(BASE_CSS)) }
            }
            body {
                header {
                    a href="/" style="text-decoration: none; color: inherit;" {
                        h1 style="font-size: 1.4rem; margin: 0;" { "Dashboard Techadores" }
                    }
                    @if let Some(email) = user {
                        nav {
                            span class="muted" { (email) }
                            form action="/dashboard/refresh" method="post" style="margin: 0;" {
                                button type="submit" class="btn" { "Refresh Manuel" }
                            }
                            a href="/hot-leads" class="btn" { "Appeler Chauds" }
                            form action="/logout" method="post" style="margin: 0;" {
                                button type="submit" class="btn" { "Déconnexion" }
                            }
                        }
                    } @else {
                        a href="/login" class="btn" { "Connexion" }
                    }
                }
                (content)
            }
        }
    }
}
