use crate::controller::{DashboardView, Notification};
use crate::domain::filter::{StatusFilter, STATUS_OPTIONS};
use crate::domain::lead::{Lead, LeadStatus};
use crate::templates::components::charts::{bar_chart, hot_cold_chart, line_chart};
use crate::templates::{badge, card, desktop_layout, kpi_card, toasts, BadgeVariant};
use chrono::NaiveDate;
use maud::{html, Markup};

pub struct DashboardVm<'a> {
    pub email: &'a str,
    pub is_admin: bool,
    pub loading: bool,
    pub view: &'a DashboardView,
    pub status_filter: &'a StatusFilter,
    pub date_filter: Option<NaiveDate>,
    pub notifications: &'a [Notification],
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "Dashboard",
        Some(vm.email),
        html! {
            (toasts(vm.notifications))
            main class="container" {
                (kpi_cards(vm.view))
                (filters(vm.status_filter, vm.date_filter))
                (charts(vm.view))
                (leads_table(&vm.view.filtered, vm.loading, vm.is_admin))
            }
        },
    )
}

fn kpi_cards(view: &DashboardView) -> Markup {
    html! {
        div class="grid-3" {
            (kpi_card("Total Leads", view.stats.total, "Tous les contacts", "inherit"))
            (kpi_card("Leads Chauds", view.stats.hot, "Prêts à être contactés", "#16a34a"))
            (kpi_card("À Appeler", view.stats.engaged, "Contacts engagés (cliqué/ouvert)", "#d97706"))
        }
    }
}

fn filters(status: &StatusFilter, date: Option<NaiveDate>) -> Markup {
    let date_value = date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    html! {
        section class="card" {
            form method="get" action="/dashboard" style="display: flex; flex-wrap: wrap; gap: 12px; align-items: center;" {
                select name="status" style="min-width: 200px; padding: 6px;" {
                    option value="all" selected[*status == StatusFilter::All] { "Tous les status" }
                    @for (value, label) in STATUS_OPTIONS {
                        option value=(value) selected[status.as_str() == value] { (label) }
                    }
                }
                input type="date" name="date" value=(date_value);
                button type="submit" class="btn" { "Filtrer" }
                @if let Some(day) = date {
                    span class="muted" { (day.format("%d/%m/%Y")) }
                    a class="btn" href=(format!("/dashboard?status={}", urlencode(status.as_str()))) {
                        "Effacer la date"
                    }
                }
            }
        }
    }
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn charts(view: &DashboardView) -> Markup {
    let (hot, other) = view.stats.hot_cold;
    html! {
        div class="grid-3" {
            (card("Leads par Type", bar_chart(&view.stats.by_type)))
            (card("Évolution Hebdomadaire", line_chart(&view.stats.weekly)))
            (card("Distribution Chauds", hot_cold_chart(hot, other)))
        }
    }
}

fn status_badge(status: &LeadStatus) -> Markup {
    let variant = match status {
        LeadStatus::Nouveau => BadgeVariant::Default,
        LeadStatus::Repondu => BadgeVariant::Secondary,
        LeadStatus::Chaud => BadgeVariant::Destructive,
        LeadStatus::Other(_) => BadgeVariant::Default,
    };
    badge(variant, status.as_str())
}

fn flag_badge(on: bool, on_variant: BadgeVariant) -> Markup {
    if on {
        badge(on_variant, "oui")
    } else {
        badge(BadgeVariant::Outline, "non")
    }
}

/// "dd/MM/yyyy HH:mm" in the display offset, or the raw value if it never parsed.
pub fn display_date(lead: &Lead) -> String {
    match lead.timestamp {
        Some(ts) => ts.format("%d/%m/%Y %H:%M").to_string(),
        None => lead.timestamp_raw.clone(),
    }
}

fn leads_table(leads: &[Lead], loading: bool, is_admin: bool) -> Markup {
    let columns = if is_admin { 13 } else { 12 };

    html! {
        section class="card" {
            h3 style="margin-top: 0;" { "Liste des Leads" }
            @if loading {
                p class="muted" style="text-align: center; padding: 48px 0;" { "Chargement des leads..." }
            } @else {
                div style="overflow-x: auto;" {
                    table {
                        thead {
                            tr {
                                th { "Nom" }
                                th { "Email" }
                                th { "Téléphone" }
                                th { "Type" }
                                th { "Surface (m²)" }
                                th { "Localisation" }
                                th { "Date" }
                                th { "Status" }
                                th { "Ouvert" }
                                th { "Cliqué" }
                                th { "Devis" }
                                th { "Chaud" }
                                @if is_admin {
                                    th { "Actions" }
                                }
                            }
                        }
                        tbody {
                            @if leads.is_empty() {
                                tr {
                                    td colspan=(columns) class="muted" style="text-align: center;" { "Aucun lead trouvé" }
                                }
                            }
                            @for lead in leads {
                                tr {
                                    td style="font-weight: 600;" { (lead.nom) }
                                    td { (lead.email) }
                                    td { (lead.telephone) }
                                    td { (lead.type_travaux) }
                                    td { (lead.surface) }
                                    td { (lead.localisation) }
                                    td { (display_date(lead)) }
                                    td { (status_badge(&lead.status)) }
                                    td { (flag_badge(lead.opened, BadgeVariant::Default)) }
                                    td { (flag_badge(lead.clicked, BadgeVariant::Default)) }
                                    td {
                                        @match &lead.devis_estimatif {
                                            Some(devis) => (badge(BadgeVariant::Default, devis)),
                                            None => (badge(BadgeVariant::Outline, "N/A")),
                                        }
                                    }
                                    td { (flag_badge(lead.hot, BadgeVariant::Destructive)) }
                                    @if is_admin {
                                        td {
                                            form method="post" action="/leads/delete" style="margin: 0;"
                                                onsubmit="return confirm('Êtes-vous sûr de vouloir supprimer ce lead?');" {
                                                input type="hidden" name="id" value=(lead.id);
                                                button type="submit" class="btn btn-danger" title="Supprimer" { "Supprimer" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::test_support::lead;

    #[test]
    fn unparseable_date_is_shown_raw() {
        let l = lead("1", "nouveau", "non", "bientôt");
        assert_eq!(display_date(&l), "bientôt");
        let l = lead("2", "nouveau", "non", "2024-01-10T09:05:00Z");
        assert_eq!(display_date(&l), "10/01/2024 09:05");
    }

    #[test]
    fn delete_column_only_for_admins() {
        let leads = vec![lead("1", "chaud", "oui", "2024-01-10T09:05:00Z")];
        let admin = leads_table(&leads, false, true).into_string();
        let agent = leads_table(&leads, false, false).into_string();
        assert!(admin.contains("/leads/delete"));
        assert!(!agent.contains("/leads/delete"));
        assert!(!agent.contains("Actions"));
    }

    #[test]
    fn empty_table_message_spans_all_columns() {
        let html = leads_table(&[], false, true).into_string();
        assert!(html.contains("Aucun lead trouvé"));
        assert!(html.contains(r#"colspan="13""#));
    }
}
