//! Field chains for every historical order and customer schema.
//!
//! Orders written by the current checkout keep billing data in a `billing`
//! object and project data under `metadata.project`; older rows use a flat
//! `metadata` bag or top-level columns. Do not drop a source without
//! migrating the rows that still use it.

use super::chain::FieldChain;

pub mod order {
    use super::FieldChain;

    pub const DOCUMENT_ID: FieldChain =
        FieldChain::new("documentId", &["/order_number", "/metadata/order_number", "/id"]);
    pub const STATUS: FieldChain = FieldChain::new("status", &["/status", "/metadata/status"]);

    pub const CUSTOMER_ID: FieldChain = FieldChain::new(
        "customerId",
        &["/customer_id", "/metadata/customer_id", "/customer/id"],
    );
    pub const AUTH_ID: FieldChain = FieldChain::new(
        "authId",
        &["/user_id", "/metadata/user_id", "/auth_user_id", "/customer/user_id"],
    );

    pub const FIRST_NAME: FieldChain = FieldChain::new(
        "billing.firstName",
        &[
            "/billing/first_name",
            "/metadata/billing/first_name",
            "/billing_first_name",
            "/customer/first_name",
        ],
    );
    pub const LAST_NAME: FieldChain = FieldChain::new(
        "billing.lastName",
        &[
            "/billing/last_name",
            "/metadata/billing/last_name",
            "/billing_last_name",
            "/customer/last_name",
        ],
    );
    pub const EMAIL: FieldChain = FieldChain::new(
        "billing.email",
        &[
            "/billing/email",
            "/metadata/billing/email",
            "/billing_email",
            "/customer/email",
            "/email",
        ],
    );
    pub const PHONE: FieldChain = FieldChain::new(
        "billing.phone",
        &[
            "/billing/phone",
            "/metadata/billing/phone",
            "/billing_phone",
            "/customer/phone",
        ],
    );
    pub const COMPANY_NAME: FieldChain = FieldChain::new(
        "billing.companyName",
        &[
            "/billing/company",
            "/metadata/billing/company",
            "/billing_company",
            "/metadata/company_name",
        ],
    );
    pub const ADDRESS: FieldChain = FieldChain::new(
        "billing.address",
        &[
            "/billing/address_1",
            "/metadata/billing/address_1",
            "/billing_address_1",
            "/billing_address",
        ],
    );
    pub const CITY: FieldChain = FieldChain::new(
        "billing.city",
        &["/billing/city", "/metadata/billing/city", "/billing_city"],
    );
    pub const TAX_ID: FieldChain = FieldChain::new(
        "billing.taxId",
        &["/billing/rut", "/metadata/billing/rut", "/billing_rut", "/metadata/rut"],
    );

    pub const PROJECT_NAME: FieldChain = FieldChain::new(
        "project.name",
        &["/metadata/project/name", "/metadata/project_name", "/project_name"],
    );
    pub const START_DATE: FieldChain = FieldChain::new(
        "project.startDate",
        &[
            "/metadata/project/start_date",
            "/metadata/start_date",
            "/start_date",
            "/rental_start",
        ],
    );
    pub const END_DATE: FieldChain = FieldChain::new(
        "project.endDate",
        &[
            "/metadata/project/end_date",
            "/metadata/end_date",
            "/end_date",
            "/rental_end",
        ],
    );
    pub const DAY_COUNT: FieldChain = FieldChain::new(
        "project.dayCount",
        &[
            "/metadata/project/jornadas",
            "/metadata/jornadas",
            "/jornadas",
            "/day_count",
        ],
    );
    pub const COMPANY_TAX_ID: FieldChain = FieldChain::new(
        "project.companyTaxId",
        &[
            "/metadata/project/company_rut",
            "/metadata/company_rut",
            "/company_rut",
        ],
    );
    pub const PICKUP_NAME: FieldChain = FieldChain::new(
        "project.pickupContactName",
        &[
            "/metadata/pickup/contact_name",
            "/metadata/pickup_contact_name",
            "/pickup_contact_name",
        ],
    );
    pub const PICKUP_PHONE: FieldChain = FieldChain::new(
        "project.pickupContactPhone",
        &[
            "/metadata/pickup/contact_phone",
            "/metadata/pickup_contact_phone",
            "/pickup_contact_phone",
        ],
    );
    pub const PICKUP_TAX_ID: FieldChain = FieldChain::new(
        "project.pickupContactTaxId",
        &[
            "/metadata/pickup/contact_rut",
            "/metadata/pickup_contact_rut",
            "/pickup_contact_rut",
        ],
    );
    pub const COMMENTS: FieldChain = FieldChain::new(
        "project.comments",
        &[
            "/metadata/project/comments",
            "/metadata/comments",
            "/customer_note",
            "/comments",
        ],
    );

    pub const LINE_ITEMS: FieldChain =
        FieldChain::new("lineItems", &["/line_items", "/metadata/line_items", "/items"]);
    pub const ITEM_NAME: FieldChain =
        FieldChain::new("lineItems[].name", &["/name", "/product_name", "/title"]);
    pub const ITEM_SKU: FieldChain = FieldChain::new("lineItems[].sku", &["/sku", "/product_sku"]);
    pub const ITEM_PRICE: FieldChain = FieldChain::new(
        "lineItems[].unitPrice",
        &["/unit_price", "/price", "/daily_price"],
    );
    pub const ITEM_QUANTITY: FieldChain =
        FieldChain::new("lineItems[].quantity", &["/quantity", "/qty"]);

    pub const COUPON_CODE: FieldChain = FieldChain::new(
        "coupon.code",
        &[
            "/coupon/code",
            "/metadata/coupon/code",
            "/metadata/coupon_code",
            "/coupon_code",
        ],
    );
    pub const COUPON_DISCOUNT: FieldChain = FieldChain::new(
        "coupon.discountAmount",
        &[
            "/coupon/discount_amount",
            "/metadata/coupon/discount_amount",
            "/metadata/discount_amount",
            "/discount_total",
        ],
    );

    pub const SHIPPING_LABEL: FieldChain = FieldChain::new(
        "shipping.methodLabel",
        &[
            "/shipping/method_label",
            "/metadata/shipping/method_label",
            "/metadata/shipping_method",
            "/shipping_method",
        ],
    );
    pub const SHIPPING_TOTAL: FieldChain = FieldChain::new(
        "shipping.total",
        &[
            "/shipping/total",
            "/metadata/shipping/total",
            "/metadata/shipping_total",
            "/shipping_total",
        ],
    );
    pub const DELIVERY_METHOD: FieldChain = FieldChain::new(
        "shipping.deliveryMethod",
        &[
            "/shipping/delivery_method",
            "/metadata/shipping/delivery_method",
            "/metadata/delivery_method",
            "/delivery_method",
        ],
    );
    pub const SHIPPING_ADDRESS: FieldChain = FieldChain::new(
        "shipping.shippingAddress",
        &[
            "/shipping/address",
            "/metadata/shipping/address",
            "/metadata/shipping_address",
            "/shipping_address",
        ],
    );
    pub const SHIPPING_PHONE: FieldChain = FieldChain::new(
        "shipping.shippingPhone",
        &[
            "/shipping/phone",
            "/metadata/shipping/phone",
            "/metadata/shipping_phone",
            "/shipping_phone",
        ],
    );

    pub const SIGNATURE_URL: FieldChain = FieldChain::new(
        "counterpartySignatureUrl",
        &["/metadata/signature_url", "/signature_url"],
    );
}

pub mod customer {
    use super::FieldChain;

    pub const CUSTOMER_ID: FieldChain = FieldChain::new("customerId", &["/id", "/customer_id"]);
    pub const AUTH_ID: FieldChain =
        FieldChain::new("authId", &["/user_id", "/auth_id", "/metadata/user_id"]);
    pub const CUSTOMER_TYPE: FieldChain = FieldChain::new(
        "customerType",
        &["/customer_type", "/metadata/customer_type", "/type"],
    );
    pub const FULL_NAME: FieldChain =
        FieldChain::new("fullName", &["/full_name", "/metadata/full_name", "/name"]);
    pub const FIRST_NAME: FieldChain =
        FieldChain::new("firstName", &["/first_name", "/metadata/first_name"]);
    pub const LAST_NAME: FieldChain =
        FieldChain::new("lastName", &["/last_name", "/metadata/last_name"]);
    pub const TAX_ID: FieldChain = FieldChain::new("taxId", &["/rut", "/tax_id", "/metadata/rut"]);
    pub const EMAIL: FieldChain = FieldChain::new("email", &["/email", "/metadata/email"]);
    pub const PHONE: FieldChain = FieldChain::new("phone", &["/phone", "/metadata/phone"]);
    pub const ADDRESS: FieldChain = FieldChain::new("address", &["/address", "/metadata/address"]);
    pub const CITY: FieldChain = FieldChain::new("city", &["/city", "/metadata/city"]);
    pub const COMPANY_NAME: FieldChain = FieldChain::new(
        "companyName",
        &["/company/name", "/metadata/company_name", "/company_name"],
    );
    pub const COMPANY_TAX_ID: FieldChain = FieldChain::new(
        "companyTaxId",
        &["/company/rut", "/metadata/company_rut", "/company_rut"],
    );
    pub const ID_FRONT_URL: FieldChain = FieldChain::new(
        "idFrontUrl",
        &["/documents/id_front", "/metadata/id_front_url", "/id_front_url"],
    );
    pub const ID_BACK_URL: FieldChain = FieldChain::new(
        "idBackUrl",
        &["/documents/id_back", "/metadata/id_back_url", "/id_back_url"],
    );
    pub const SIGNATURE_URL: FieldChain = FieldChain::new(
        "signatureUrl",
        &["/documents/signature", "/metadata/signature_url", "/signature_url"],
    );
    pub const COMPANY_REGISTRATION_URL: FieldChain = FieldChain::new(
        "companyRegistrationUrl",
        &[
            "/documents/company_registration",
            "/metadata/company_registration_url",
            "/company_registration_url",
        ],
    );
}
