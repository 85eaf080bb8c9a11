//! Fixed legal wording.
//!
//! Clause bodies may contain the placeholders `{arrendador}` and
//! `{arrendatario}`; the standalone contract replaces them with the named
//! parties. Nothing else in the text varies per customer.

use serde::{Deserialize, Serialize};

pub(crate) const CONTRACT_CLAUSE_COUNT: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalClause {
    pub title: String,
    pub body: String,
}

impl LegalClause {
    fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalTexts {
    pub terms_acceptance: String,
    pub quote_notice: String,
    pub order_annex: Vec<LegalClause>,
    pub contract_title: String,
    pub contract_clauses: Vec<LegalClause>,
}

impl Default for LegalTexts {
    fn default() -> Self {
        Self {
            terms_acceptance: concat!(
                "La aceptación de este documento, el pago de la reserva o el retiro de los equipos ",
                "implica la aceptación íntegra de los términos y condiciones de arriendo publicados ",
                "por la empresa, incluidos los plazos de devolución, la responsabilidad por daños y ",
                "las condiciones de pago aquí detalladas."
            )
            .to_string(),
            quote_notice: concat!(
                "Esta cotización no constituye reserva. La disponibilidad de los equipos se encuentra ",
                "en revisión y será confirmada por nuestro equipo una vez recibido el pago de la reserva."
            )
            .to_string(),
            order_annex: vec![
                LegalClause::new(
                    "Entrega y devolución",
                    "Los equipos se entregan en perfecto estado de funcionamiento y deben ser devueltos en la fecha de término indicada, en las mismas condiciones en que fueron recibidos.",
                ),
                LegalClause::new(
                    "Responsabilidad",
                    "El arrendatario es responsable por la pérdida, robo o daño de los equipos durante todo el período de arriendo, debiendo cubrir el costo de reparación o reposición.",
                ),
                LegalClause::new(
                    "Pagos",
                    "La reserva corresponde al porcentaje indicado del total y se paga al confirmar el pedido. El saldo se paga al momento de la entrega de los equipos.",
                ),
                LegalClause::new(
                    "Atrasos",
                    "Cada jornada de atraso en la devolución se cobrará a la tarifa diaria vigente de cada equipo, sin perjuicio de las demás acciones que correspondan.",
                ),
                LegalClause::new(
                    "Anulaciones",
                    "La anulación con menos de 48 horas de anticipación al inicio del arriendo no da derecho a la devolución de la reserva.",
                ),
            ],
            contract_title: "Contrato Marco de Arriendo de Equipos".to_string(),
            contract_clauses: default_contract_clauses(),
        }
    }
}

fn default_contract_clauses() -> Vec<LegalClause> {
    vec![
        LegalClause::new(
            "Partes",
            "El presente contrato se celebra entre {arrendador}, en adelante \"el Arrendador\", y {arrendatario}, en adelante \"el Arrendatario\".",
        ),
        LegalClause::new(
            "Objeto",
            "El Arrendador da en arriendo al Arrendatario los equipos individualizados en cada cotización u orden aceptada, las que se entienden parte integrante de este contrato.",
        ),
        LegalClause::new(
            "Vigencia",
            "Este contrato rige desde su firma y por tiempo indefinido, aplicándose a todos los arriendos que el Arrendatario solicite mientras se encuentre vigente.",
        ),
        LegalClause::new(
            "Precio",
            "El precio de cada arriendo se calcula por jornada, multiplicando la tarifa diaria de cada equipo por su cantidad y por el número de jornadas, más el impuesto al valor agregado.",
        ),
        LegalClause::new(
            "Forma de pago",
            "El Arrendatario pagará una reserva al confirmar cada pedido y el saldo al momento de la entrega de los equipos, mediante transferencia a la cuenta informada por el Arrendador.",
        ),
        LegalClause::new(
            "Entrega",
            "Los equipos se entregan en las dependencias del Arrendador o en la dirección de despacho acordada. El Arrendatario declara recibirlos en perfecto estado al firmar la guía de entrega.",
        ),
        LegalClause::new(
            "Uso de los equipos",
            "El Arrendatario se obliga a usar los equipos conforme a su naturaleza y a las instrucciones del fabricante, y a no subarrendarlos ni cederlos a terceros sin autorización escrita.",
        ),
        LegalClause::new(
            "Custodia",
            "Desde la entrega y hasta la devolución, el Arrendatario es el único responsable de la custodia de los equipos, respondiendo incluso por caso fortuito.",
        ),
        LegalClause::new(
            "Daños y pérdidas",
            "En caso de daño, pérdida o robo, el Arrendatario pagará el valor de reparación o el valor de reposición a nuevo del equipo, según corresponda.",
        ),
        LegalClause::new(
            "Devolución",
            "Los equipos deben devolverse en la fecha pactada. Cada jornada de atraso se cobrará a la tarifa diaria vigente.",
        ),
        LegalClause::new(
            "Garantía",
            "El Arrendador podrá exigir una garantía adicional según el valor de los equipos, la que se devolverá una vez verificado su estado.",
        ),
        LegalClause::new(
            "Documentación",
            "{arrendatario} declara que la documentación de identidad entregada es fidedigna y autoriza su uso exclusivo para fines de este contrato.",
        ),
        LegalClause::new(
            "Término",
            "Cualquiera de las partes podrá poner término a este contrato mediante aviso escrito, sin afectar los arriendos en curso.",
        ),
        LegalClause::new(
            "Domicilio y jurisdicción",
            "Para todos los efectos legales las partes fijan domicilio en la ciudad de Santiago y se someten a la jurisdicción de sus tribunales ordinarios.",
        ),
    ]
}
