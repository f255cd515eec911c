use maud::{Markup, html};

use crate::model::{MatrixRow, SwingLength};

#[must_use]
pub fn render_matrix(rows: &[MatrixRow]) -> Markup {
    html! {
        @if rows.is_empty() {
            div class="empty" {
                h2 { "No wedges yet" }
                p { "Add your wedges in The Bag, then run a Combine to fill in your distances." }
                a class="button" href="/bag" { "Set up your bag" }
            }
        } @else {
            h2 { "Yardage Matrix" }
            p class="hint" { "All distances in yards" }
            table class="matrix" {
                thead {
                    tr {
                        th { "Club" }
                        th { "Loft" }
                        @for swing in SwingLength::ALL {
                            th {
                                div { (swing.label()) }
                                div class="clock" { (swing.clock()) }
                            }
                        }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            td { (row.club) }
                            td { (row.loft) "°" }
                            @for swing in SwingLength::ALL {
                                td class="yards" { (row.cell(swing)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
