//! Section builders shared by every document variant.
//!
//! Visibility rules live in plain functions (`logistics_for`, `summary_rows`,
//! `table_rows`) so they can be checked without building nodes.

use rust_decimal::Decimal;

use crate::config::{CompanyIdentity, LegalClause, LegalTexts};
use crate::documents::calculation::{PricedDocument, RowBreakdown};
use crate::documents::format::{format_currency, format_date, format_percent};
use crate::documents::model::{DeliveryMethod, DocumentData, LineItem, ShippingInfo};

use super::tree::{Align, Node, TextSize, TextStyle};

const TABLE_COLUMNS: [u16; 7] = [6, 2, 1, 1, 2, 2, 2];
const SIGNATURE_IMAGE_WIDTH: u16 = 140;
const SIGNATURE_SLOT_HEIGHT: u16 = 56;

// ============================================================================
// Header
// ============================================================================

pub fn document_header(company: &CompanyIdentity, title: &str, reference: &str, issued_on: &str) -> Node {
    let identity = Node::stack(vec![
        Node::heading(company.trade_name.clone()),
        Node::small(format!("{} - RUT {}", company.legal_name, company.tax_id)),
        Node::small(company.address.clone()),
    ]);

    let title_block = Node::stack(vec![
        Node::styled(
            title,
            TextStyle {
                size: TextSize::Title,
                bold: true,
                align: Align::Right,
                ..TextStyle::default()
            },
        ),
        Node::bold(format!("N° {reference}")).aligned(Align::Right),
        Node::text(format!("Fecha de emisión: {issued_on}")).aligned(Align::Right),
    ]);

    Node::grid(vec![3, 2], vec![identity, title_block]).keyed("header")
}

// ============================================================================
// Customer / project / logistics columns
// ============================================================================

/// Which logistics block the notes column shows. Never both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Logistics<'a> {
    Pickup {
        name: &'a str,
        phone: Option<&'a str>,
        tax_id: Option<&'a str>,
    },
    Shipping(&'a ShippingInfo),
    NoInformation,
}

pub fn logistics_for(data: &DocumentData) -> Logistics<'_> {
    let project = &data.project;
    match project.pickup_contact_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Logistics::Pickup {
            name,
            phone: project.pickup_contact_phone.as_deref(),
            tax_id: project.pickup_contact_tax_id.as_deref(),
        },
        _ => match &data.shipping {
            Some(shipping) => Logistics::Shipping(shipping),
            None => Logistics::NoInformation,
        },
    }
}

pub fn info_columns(data: &DocumentData) -> Node {
    Node::grid(
        vec![1, 1, 1],
        vec![customer_column(data), project_column(data), notes_column(data)],
    )
    .keyed("info")
}

fn customer_column(data: &DocumentData) -> Node {
    let billing = &data.billing;
    let mut lines = vec![Node::heading("Cliente"), Node::bold(billing.full_name())];

    if billing.is_company() {
        lines.push(Node::text(billing.company_name.clone().unwrap_or_default()));
        let company_tax_id = data
            .project
            .company_tax_id
            .as_deref()
            .or(billing.tax_id.as_deref());
        if let Some(tax_id) = company_tax_id {
            lines.push(Node::text(format!("RUT empresa: {tax_id}")));
        }
    } else if let Some(tax_id) = billing.tax_id.as_deref() {
        lines.push(Node::text(format!("RUT: {tax_id}")));
    }

    lines.push(Node::text(billing.email.clone()));
    if let Some(phone) = billing.phone.as_deref() {
        lines.push(Node::text(format!("Teléfono: {phone}")));
    }
    let location: Vec<&str> = [billing.address.as_deref(), billing.city.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !location.is_empty() {
        lines.push(Node::text(location.join(", ")));
    }

    Node::stack(lines).keyed("info.customer")
}

fn project_column(data: &DocumentData) -> Node {
    let project = &data.project;
    Node::stack(vec![
        Node::heading("Proyecto"),
        Node::bold(project.name.clone()),
        Node::text(format!("Inicio: {}", format_date(&project.start_date))),
        Node::text(format!("Término: {}", format_date(&project.end_date))),
        Node::text(format!("Jornadas: {}", project.day_count)),
    ])
    .keyed("info.project")
}

fn notes_column(data: &DocumentData) -> Node {
    let mut lines = vec![Node::heading("Observaciones")];
    if let Some(comments) = data.project.comments.as_deref() {
        lines.push(Node::paragraph(comments));
    }
    lines.push(logistics_block(logistics_for(data)));
    Node::stack(lines).keyed("info.notes")
}

fn logistics_block(logistics: Logistics<'_>) -> Node {
    match logistics {
        Logistics::Pickup { name, phone, tax_id } => {
            let mut lines = vec![
                Node::bold("Retiro de equipos"),
                Node::text(format!("Retira: {name}")),
            ];
            if let Some(tax_id) = tax_id {
                lines.push(Node::text(format!("RUT: {tax_id}")));
            }
            if let Some(phone) = phone {
                lines.push(Node::text(format!("Teléfono: {phone}")));
            }
            Node::stack(lines).keyed("logistics.pickup")
        }
        Logistics::Shipping(shipping) => {
            let method = match shipping.delivery_method {
                DeliveryMethod::Pickup => "Retiro en bodega",
                DeliveryMethod::Shipping => "Despacho a domicilio",
            };
            let mut lines = vec![
                Node::bold(shipping.method_label.clone()),
                Node::text(method),
            ];
            if let Some(address) = shipping.shipping_address.as_deref() {
                lines.push(Node::text(format!("Dirección: {address}")));
            }
            if let Some(phone) = shipping.shipping_phone.as_deref() {
                lines.push(Node::text(format!("Teléfono: {phone}")));
            }
            Node::stack(lines).keyed("logistics.shipping")
        }
        Logistics::NoInformation => {
            Node::stack(vec![Node::small("Sin información adicional")]).keyed("logistics.none")
        }
    }
}

// ============================================================================
// Line item table
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    pub item: &'a LineItem,
    pub day_count: i64,
    pub amounts: RowBreakdown,
}

/// Table rows paired with the amounts priced alongside the totals.
pub fn table_rows(priced: &PricedDocument) -> Vec<TableRow<'_>> {
    let data = priced.data();
    data.line_items
        .iter()
        .zip(priced.rows())
        .map(|(item, amounts)| TableRow {
            item,
            day_count: data.project.day_count,
            amounts: amounts.clone(),
        })
        .collect()
}

pub fn line_item_table(priced: &PricedDocument) -> Node {
    let engine = priced.engine();
    let tax_label = format!("IVA {}", format_percent(engine.tax_rate()));

    let header = Node::grid(
        TABLE_COLUMNS.to_vec(),
        ["Equipo", "Precio día", "Cant.", "Jorn.", "Neto", tax_label.as_str(), "Total"]
            .into_iter()
            .map(Node::bold)
            .collect(),
    )
    .keyed("items.header")
    .framed(Some(235));

    let mut rows = vec![header];
    for row in table_rows(priced) {
        let name = match row.item.sku.as_deref() {
            Some(sku) => format!("{} ({sku})", row.item.name),
            None => row.item.name.clone(),
        };
        rows.push(
            Node::grid(
                TABLE_COLUMNS.to_vec(),
                vec![
                    Node::text(name),
                    Node::text(format_currency(row.item.unit_price)).aligned(Align::Right),
                    Node::text(row.item.quantity.to_string()).aligned(Align::Right),
                    Node::text(row.day_count.to_string()).aligned(Align::Right),
                    Node::text(format_currency(row.amounts.net)).aligned(Align::Right),
                    Node::text(format_currency(row.amounts.tax)).aligned(Align::Right),
                    Node::text(format_currency(row.amounts.gross)).aligned(Align::Right),
                ],
            )
            .keyed("items.row"),
        );
    }

    Node::stack(rows).keyed("items")
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRowKind {
    Products,
    Discount,
    DiscountedSubtotal,
    Shipping,
    Tax,
    Total,
    Deposit,
    Balance,
}

impl SummaryRowKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Products => "summary.products",
            Self::Discount => "summary.discount",
            Self::DiscountedSubtotal => "summary.discounted_subtotal",
            Self::Shipping => "summary.shipping",
            Self::Tax => "summary.tax",
            Self::Total => "summary.total",
            Self::Deposit => "summary.deposit",
            Self::Balance => "summary.balance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub kind: SummaryRowKind,
    pub label: String,
    pub amount: Decimal,
}

/// Rows of the summary block, top to bottom, only those that apply.
pub fn summary_rows(priced: &PricedDocument) -> Vec<SummaryRow> {
    let totals = priced.totals();
    let engine = priced.engine();
    let data = priced.data();
    let row = |kind, label: String, amount| SummaryRow { kind, label, amount };

    let mut rows = vec![row(
        SummaryRowKind::Products,
        "Subtotal productos".to_string(),
        totals.subtotal(),
    )];

    if priced.has_discount() {
        let code = data
            .coupon
            .as_ref()
            .map(|coupon| coupon.code.as_str())
            .unwrap_or_default();
        rows.push(row(
            SummaryRowKind::Discount,
            format!("Descuento ({code})"),
            -totals.discount(),
        ));
        rows.push(row(
            SummaryRowKind::DiscountedSubtotal,
            "Subtotal con descuento".to_string(),
            totals.discounted_subtotal(),
        ));
    }

    if let Some(shipping) = data.shipping.as_ref().filter(|s| s.total > Decimal::ZERO) {
        rows.push(row(
            SummaryRowKind::Shipping,
            format!("Despacho: {} (se cobra aparte)", shipping.method_label),
            shipping.total,
        ));
    }

    let deposit_share = format_percent(engine.deposit_rate());
    let balance_share = format_percent(Decimal::ONE - engine.deposit_rate());
    rows.push(row(
        SummaryRowKind::Tax,
        format!("IVA {}", format_percent(engine.tax_rate())),
        totals.tax(),
    ));
    rows.push(row(SummaryRowKind::Total, "Total".to_string(), totals.total()));
    rows.push(row(
        SummaryRowKind::Deposit,
        format!("Reserva {deposit_share}"),
        totals.deposit(),
    ));
    rows.push(row(
        SummaryRowKind::Balance,
        format!("Saldo {balance_share}"),
        totals.balance(),
    ));
    rows
}

pub fn summary_block(priced: &PricedDocument) -> Node {
    let rows = summary_rows(priced)
        .into_iter()
        .map(|row| {
            let emphasised = matches!(row.kind, SummaryRowKind::Total);
            let label = if emphasised {
                Node::bold(row.label)
            } else {
                Node::text(row.label)
            };
            let amount = if emphasised {
                Node::bold(format_currency(row.amount))
            } else {
                Node::text(format_currency(row.amount))
            };
            Node::grid(vec![3, 2], vec![label, amount.aligned(Align::Right)]).keyed(row.kind.key())
        })
        .collect();

    Node::grid(vec![3, 2], vec![Node::blank(0), Node::stack(rows).framed(None)]).keyed("summary")
}

// ============================================================================
// Company, terms and closings
// ============================================================================

pub fn company_block(company: &CompanyIdentity) -> Node {
    let bank = &company.bank;
    let identity = Node::stack(vec![
        Node::heading("Datos de la empresa"),
        Node::bold(company.legal_name.clone()),
        Node::text(format!("RUT: {}", company.tax_id)),
        Node::text(company.address.clone()),
        Node::text(format!("Teléfono: {}", company.phone)),
        Node::text(company.email.clone()),
        Node::text(company.website.clone()),
    ]);
    let transfer = Node::stack(vec![
        Node::heading("Datos para transferencia"),
        Node::text(format!("Banco: {}", bank.bank_name)),
        Node::text(format!("{}: {}", bank.account_type, bank.account_number)),
        Node::text(format!("Titular: {}", bank.account_holder)),
        Node::text(format!("RUT: {}", bank.holder_tax_id)),
        Node::text(format!("Comprobante a: {}", bank.transfer_email)),
    ]);

    Node::grid(vec![1, 1], vec![identity, transfer])
        .framed(Some(248))
        .keyed("company")
}

pub fn terms_block(legal: &LegalTexts) -> Node {
    Node::stack(vec![
        Node::bold("Aceptación de términos"),
        Node::paragraph(legal.terms_acceptance.clone()),
    ])
    .keyed("terms")
}

pub fn advisory_notice(legal: &LegalTexts) -> Node {
    Node::stack(vec![
        Node::bold("Aviso"),
        Node::paragraph(legal.quote_notice.clone()),
    ])
    .framed(Some(240))
    .keyed("notice")
}

pub fn numbered_clauses(clauses: &[LegalClause], first_number: usize, fill: &dyn Fn(&str) -> String) -> Vec<Node> {
    clauses
        .iter()
        .enumerate()
        .map(|(offset, clause)| {
            Node::stack(vec![
                Node::bold(format!("{}. {}", first_number + offset, clause.title)),
                Node::paragraph(fill(&clause.body)),
            ])
            .keyed("clause")
        })
        .collect()
}

pub fn legal_annex(legal: &LegalTexts) -> Node {
    let mut children = vec![Node::heading("Anexo: condiciones generales de arriendo")];
    children.extend(numbered_clauses(&legal.order_annex, 1, &|body| body.to_string()));
    Node::stack(children).keyed("annex")
}

/// One side of a signature block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParty<'a> {
    pub role: &'a str,
    pub name: String,
    pub tax_id: Option<String>,
    pub signature_url: Option<&'a str>,
}

fn signature_column(party: &SignatureParty<'_>, key: &str) -> Node {
    let slot = match party.signature_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => Node::image(url, SIGNATURE_IMAGE_WIDTH),
        None => Node::blank(SIGNATURE_SLOT_HEIGHT),
    };
    let mut lines = vec![
        slot,
        Node::text("________________________________").aligned(Align::Center),
        Node::bold(party.name.clone()).aligned(Align::Center),
    ];
    if let Some(tax_id) = party.tax_id.as_deref() {
        lines.push(Node::text(format!("RUT: {tax_id}")).aligned(Align::Center));
    }
    lines.push(Node::small(party.role).aligned(Align::Center));
    Node::stack(lines).keyed(key)
}

pub fn signature_block(company: &SignatureParty<'_>, counterparty: &SignatureParty<'_>) -> Node {
    Node::grid(
        vec![1, 1],
        vec![
            signature_column(company, "signature.company"),
            signature_column(counterparty, "signature.counterparty"),
        ],
    )
    .keyed("signatures")
}
