use crate::controller::{DashboardView, Notification};
use crate::templates::{desktop_layout, toasts};
use maud::{html, Markup, PreEscaped};

// Clipboard writes happen in the browser; a denied write is ignored.
const COPY_SCRIPT: &str = r#"
document.addEventListener('click', function (ev) {
  var btn = ev.target.closest('[data-copy]');
  if (!btn || !navigator.clipboard) return;
  navigator.clipboard.writeText(btn.dataset.copy).then(function () {
    var box = document.getElementById('copy-toast');
    box.textContent = btn.dataset.toast;
    box.hidden = false;
    setTimeout(function () { box.hidden = true; }, 2000);
  }).catch(function () {});
});
"#;

pub fn hot_leads_page(email: &str, view: &DashboardView, notifications: &[Notification]) -> Markup {
    desktop_layout(
        "Leads Chauds",
        Some(email),
        html! {
            (toasts(notifications))
            div class="toasts" {
                div id="copy-toast" class="toast toast-success" role="status" hidden {}
            }
            main class="container" {
                section class="card" {
                    h2 style="margin-top: 0;" { "Leads Chauds à Appeler (" (view.hot.len()) ")" }
                    p class="muted" { "Liste des contacts chauds prêts à être contactés" }

                    div style="display: flex; gap: 8px; margin-bottom: 16px;" {
                        button type="button" class="btn" data-copy=(view.phone_list)
                            data-toast="Tous les téléphones copiés" { "Copier tous les téléphones" }
                        button type="button" class="btn" data-copy=(view.email_list)
                            data-toast="Tous les emails copiés" { "Copier tous les emails" }
                        a href="/dashboard" class="btn" { "Retour" }
                    }

                    table {
                        thead {
                            tr {
                                th { "Nom" }
                                th { "Téléphone" }
                                th { "Email" }
                                th { "Type" }
                                th { "Actions" }
                            }
                        }
                        tbody {
                            @if view.hot.is_empty() {
                                tr {
                                    td colspan="5" class="muted" style="text-align: center;" { "Aucun lead chaud disponible" }
                                }
                            }
                            @for lead in &view.hot {
                                tr {
                                    td style="font-weight: 600;" { (lead.nom) }
                                    td { (lead.telephone) }
                                    td { (lead.email) }
                                    td { (lead.type_travaux) }
                                    td {
                                        button type="button" class="btn" data-copy=(lead.telephone)
                                            data-toast="Téléphone copié dans le presse-papiers" { "Copier tél." }
                                        " "
                                        button type="button" class="btn" data-copy=(lead.email)
                                            data-toast="Email copié dans le presse-papiers" { "Copier email" }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h3 style="margin-top: 0;" { "Téléphones" }
                    textarea readonly rows="6" style="width: 100%;" { (view.phone_list) }
                    h3 { "Emails" }
                    textarea readonly rows="3" style="width: 100%;" { (view.email_list) }
                }
            }
            script { (PreEscaped(COPY_SCRIPT)) }
        },
    )
}
