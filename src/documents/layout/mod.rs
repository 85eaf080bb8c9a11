//! Layout assembly.
//!
//! The four document variants share one set of section builders
//! (`sections`) and differ only in the `VariantDescriptor` they are assembled
//! with. Assemblers are pure: the same input and issue date produce the same
//! tree.
//!
//! Order-keyed variants are two pages:
//! 1. header, lead paragraph, customer/project/notes columns, item table, summary
//! 2. company block, terms acceptance, then the variant closing
//!    (advisory notice, or legal annex plus signatures)

mod contract;
pub mod sections;
pub mod tree;

pub use contract::assemble_customer_contract;
pub use tree::{DocumentTree, Node, Page};

use chrono::NaiveDate;

use crate::config::BusinessConfig;
use crate::documents::calculation::PricedDocument;
use crate::documents::format::format_long_date;
use crate::documents::model::DocumentKind;

use sections::SignatureParty;

/// How a variant ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    AdvisoryNotice,
    LegalAnnex,
    /// The numbered rental clauses with both parties named.
    ContractClauses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signatures {
    None,
    Dual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyedBy {
    Order,
    Customer,
}

/// The per-variant deltas over the shared section schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub kind: DocumentKind,
    pub closing: Closing,
    pub signatures: Signatures,
    pub keyed_by: KeyedBy,
    /// Opening paragraph under the header.
    pub lead: &'static str,
}

pub const QUOTE: VariantDescriptor = VariantDescriptor {
    kind: DocumentKind::Quote,
    closing: Closing::AdvisoryNotice,
    signatures: Signatures::None,
    keyed_by: KeyedBy::Order,
    lead: "Junto con saludar, le enviamos el detalle de los equipos solicitados y los valores por el período indicado.",
};

pub const ORDER_CONTRACT: VariantDescriptor = VariantDescriptor {
    kind: DocumentKind::OrderContract,
    closing: Closing::LegalAnnex,
    signatures: Signatures::Dual,
    keyed_by: KeyedBy::Order,
    lead: "Las partes acuerdan el arriendo de los equipos detallados a continuación, por el período y valores indicados, sujeto a las condiciones del anexo.",
};

pub const PROCESSING_CONFIRMATION: VariantDescriptor = VariantDescriptor {
    kind: DocumentKind::ProcessingConfirmation,
    closing: Closing::LegalAnnex,
    signatures: Signatures::Dual,
    keyed_by: KeyedBy::Order,
    lead: "Confirmamos que su pedido ha sido recibido y se encuentra en proceso. A continuación el detalle de los equipos reservados.",
};

pub const CUSTOMER_CONTRACT: VariantDescriptor = VariantDescriptor {
    kind: DocumentKind::CustomerContract,
    closing: Closing::ContractClauses,
    signatures: Signatures::Dual,
    keyed_by: KeyedBy::Customer,
    lead: "Las partes individualizadas a continuación celebran el presente contrato de arriendo de equipos, que regirá todos los pedidos futuros del arrendatario.",
};

pub fn descriptor(kind: DocumentKind) -> &'static VariantDescriptor {
    match kind {
        DocumentKind::Quote => &QUOTE,
        DocumentKind::OrderContract => &ORDER_CONTRACT,
        DocumentKind::ProcessingConfirmation => &PROCESSING_CONFIRMATION,
        DocumentKind::CustomerContract => &CUSTOMER_CONTRACT,
    }
}

/// Assemble any order-keyed variant.
pub fn assemble_order_document(
    variant: &VariantDescriptor,
    priced: &PricedDocument,
    config: &BusinessConfig,
    issued_on: NaiveDate,
) -> DocumentTree {
    debug_assert_eq!(variant.keyed_by, KeyedBy::Order);

    let data = priced.data();
    let company = &config.company;
    let mut tree = DocumentTree::new(variant.kind, variant.kind.title());

    tree.push_page(vec![
        sections::document_header(
            company,
            variant.kind.title(),
            &data.document_id,
            &format_long_date(issued_on),
        ),
        Node::paragraph(variant.lead),
        sections::info_columns(data),
        sections::line_item_table(priced),
        sections::summary_block(priced),
    ]);

    let billing = &data.billing;
    let counterparty_name = if billing.is_company() {
        format!(
            "{} p.p. {}",
            billing.full_name(),
            billing.company_name.as_deref().unwrap_or_default()
        )
    } else {
        billing.full_name()
    };

    let mut closing = vec![
        sections::company_block(company),
        sections::terms_block(&config.legal),
    ];
    match variant.closing {
        Closing::AdvisoryNotice => closing.push(sections::advisory_notice(&config.legal)),
        Closing::LegalAnnex => closing.push(sections::legal_annex(&config.legal)),
        Closing::ContractClauses => {
            let lessor = contract::lessor_clause(company);
            let lessee = contract::with_tax_id(&counterparty_name, billing.tax_id.as_deref());
            let fill = |body: &str| contract::fill_parties(body, &lessor, &lessee);
            closing.push(
                Node::stack(sections::numbered_clauses(&config.legal.contract_clauses, 1, &fill))
                    .keyed("clauses"),
            );
        }
    }
    if variant.signatures == Signatures::Dual {
        closing.push(sections::signature_block(
            &SignatureParty {
                role: "Arrendador",
                name: company.representative_name.clone(),
                tax_id: Some(company.tax_id.clone()),
                signature_url: None,
            },
            &SignatureParty {
                role: "Arrendatario",
                name: counterparty_name,
                tax_id: billing.tax_id.clone(),
                signature_url: data.counterparty_signature_url.as_deref(),
            },
        ));
    }
    tree.push_page(closing);

    tree
}

pub fn assemble_quote(priced: &PricedDocument, config: &BusinessConfig, issued_on: NaiveDate) -> DocumentTree {
    assemble_order_document(&QUOTE, priced, config, issued_on)
}

pub fn assemble_order_contract(
    priced: &PricedDocument,
    config: &BusinessConfig,
    issued_on: NaiveDate,
) -> DocumentTree {
    assemble_order_document(&ORDER_CONTRACT, priced, config, issued_on)
}

pub fn assemble_processing_confirmation(
    priced: &PricedDocument,
    config: &BusinessConfig,
    issued_on: NaiveDate,
) -> DocumentTree {
    assemble_order_document(&PROCESSING_CONFIRMATION, priced, config, issued_on)
}
