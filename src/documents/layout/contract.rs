//! Standalone customer contract: six fixed pages.
//!
//! 1. cover with the parties and the company block
//! 2-5. the numbered clauses, split 4/4/3/3
//! 6. terms acceptance, signatures and the identity attachments
//!
//! Clause text is fixed; only `{arrendador}` and `{arrendatario}` vary.

use chrono::NaiveDate;

use crate::config::{BusinessConfig, CompanyIdentity};
use crate::documents::format::format_long_date;
use crate::documents::model::{CustomerType, StandaloneContractData};

use super::sections::{self, SignatureParty};
use super::tree::{DocumentTree, Node};
use super::{Closing, Signatures, CUSTOMER_CONTRACT};

const CLAUSES_PER_PAGE: [usize; 4] = [4, 4, 3, 3];
const ATTACHMENT_IMAGE_WIDTH: u16 = 220;
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "webp"];

pub(super) fn lessor_clause(company: &CompanyIdentity) -> String {
    format!(
        "{}, RUT {}, representada por {}, RUT {}",
        company.legal_name, company.tax_id, company.representative_name, company.representative_tax_id
    )
}

pub(super) fn with_tax_id(name: &str, tax_id: Option<&str>) -> String {
    match tax_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{name}, RUT {id}"),
        None => name.to_string(),
    }
}

/// Clause body with both parties named.
pub(super) fn fill_parties(body: &str, lessor: &str, lessee: &str) -> String {
    body.replace("{arrendador}", lessor).replace("{arrendatario}", lessee)
}

/// Named-party wording for the customer side.
pub(crate) fn lessee_clause(data: &StandaloneContractData) -> String {
    let person = with_tax_id(data.full_name.trim(), data.tax_id.as_deref());
    match (data.customer_type, data.company_name.as_deref()) {
        (CustomerType::Company, Some(company)) if !company.trim().is_empty() => format!(
            "{}, representada por {person}",
            with_tax_id(company.trim(), data.company_tax_id.as_deref())
        ),
        _ => person,
    }
}

fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn parties_block(lessor: &str, lessee: &str, data: &StandaloneContractData) -> Node {
    let mut customer = vec![Node::heading("Arrendatario"), Node::text(lessee)];
    customer.push(Node::text(data.email.clone()));
    if let Some(phone) = data.phone.as_deref() {
        customer.push(Node::text(format!("Teléfono: {phone}")));
    }
    let location: Vec<&str> = [data.address.as_deref(), data.city.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !location.is_empty() {
        customer.push(Node::text(format!("Domicilio: {}", location.join(", "))));
    }

    Node::grid(
        vec![1, 1],
        vec![
            Node::stack(vec![Node::heading("Arrendador"), Node::text(lessor)]).keyed("party.lessor"),
            Node::stack(customer).keyed("party.lessee"),
        ],
    )
    .keyed("parties")
}

fn attachments_block(data: &StandaloneContractData) -> Node {
    let attachments = data.attachments();
    let mut children = vec![Node::heading("Documentos adjuntos")];
    if attachments.is_empty() {
        children.push(Node::small("Sin documentos adjuntos"));
    }
    for (label, url) in attachments {
        let preview = if is_image_url(url) {
            Node::image(url, ATTACHMENT_IMAGE_WIDTH)
        } else {
            Node::small(url)
        };
        children.push(Node::stack(vec![Node::bold(label), preview]).keyed("attachment"));
    }
    Node::stack(children).keyed("attachments")
}

pub fn assemble_customer_contract(
    data: &StandaloneContractData,
    config: &BusinessConfig,
    issued_on: NaiveDate,
) -> DocumentTree {
    let variant = &CUSTOMER_CONTRACT;
    let company = &config.company;
    let legal = &config.legal;
    let lessor = lessor_clause(company);
    let lessee = lessee_clause(data);
    let fill = |body: &str| fill_parties(body, &lessor, &lessee);

    let mut tree = DocumentTree::new(variant.kind, legal.contract_title.clone());

    tree.push_page(vec![
        sections::document_header(
            company,
            &legal.contract_title,
            &data.customer_id,
            &format_long_date(issued_on),
        ),
        Node::paragraph(variant.lead),
        parties_block(&lessor, &lessee, data),
        sections::company_block(company),
    ]);

    match variant.closing {
        Closing::ContractClauses => {
            let mut first = 0;
            for count in CLAUSES_PER_PAGE {
                let end = (first + count).min(legal.contract_clauses.len());
                let clauses = legal.contract_clauses.get(first..end).unwrap_or_default();
                tree.push_page(vec![
                    Node::stack(sections::numbered_clauses(clauses, first + 1, &fill)).keyed("clauses")
                ]);
                first = end;
            }
        }
        Closing::LegalAnnex => tree.push_page(vec![sections::legal_annex(legal)]),
        Closing::AdvisoryNotice => tree.push_page(vec![sections::advisory_notice(legal)]),
    }

    let signer = match data.customer_type {
        CustomerType::Company => data
            .company_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| data.full_name.clone()),
        CustomerType::Individual => data.full_name.clone(),
    };
    let signer_tax_id = match data.customer_type {
        CustomerType::Company => data.company_tax_id.clone().or_else(|| data.tax_id.clone()),
        CustomerType::Individual => data.tax_id.clone(),
    };
    let mut last = vec![sections::terms_block(legal)];
    if variant.signatures == Signatures::Dual {
        last.push(sections::signature_block(
            &SignatureParty {
                role: "Arrendador",
                name: company.representative_name.clone(),
                tax_id: Some(company.tax_id.clone()),
                signature_url: None,
            },
            &SignatureParty {
                role: "Arrendatario",
                name: signer,
                tax_id: signer_tax_id,
                signature_url: data.signature_url.as_deref(),
            },
        ));
    }
    last.push(attachments_block(data));
    tree.push_page(last);

    tree
}
