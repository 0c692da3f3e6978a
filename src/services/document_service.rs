// src/services/document_service.rs

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrderRepository, SettingsRepository},
    middleware::tenancy::TenantScope,
    models::{
        orders::{order_reference, Order, OrderItemType},
        settings::{ReceiptTemplate, Settings},
        tenancy::Tenant,
    },
};

/// Uma linha impressa no recibo. Devoluções saem com total negativo.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Conteúdo do recibo, já decidido a partir do pedido e das configurações.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub store_name: String,
    pub header: Option<String>,
    pub reference: String,
    pub issued_at: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Option<Decimal>,
    pub total: Decimal,
    pub currency: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub footer: Option<String>,
    pub qr_payload: Option<String>,
    pub compact: bool,
}

pub fn build_receipt(tenant: &Tenant, settings: &Settings, order: &Order) -> Receipt {
    let template = settings.receipt_template;

    let lines = order
        .items
        .iter()
        .map(|item| {
            let gross = Decimal::from(item.quantity) * item.price_at_time;
            let (description, total) = match item.item_type {
                OrderItemType::Sale => (item.product_name.clone(), gross),
                OrderItemType::Return => (format!("{} (return)", item.product_name), -gross),
            };
            ReceiptLine { description, quantity: item.quantity, unit_price: item.price_at_time, total }
        })
        .collect();

    Receipt {
        store_name: tenant.name.clone(),
        header: settings.receipt_header.clone(),
        reference: order_reference(order.id),
        issued_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        lines,
        subtotal: order.subtotal,
        discount: order.discount_amount,
        tax: settings.receipt_show_tax.then_some(order.tax_amount),
        total: order.total_amount,
        currency: settings.currency.clone(),
        payment_method: order.payment_method.clone(),
        notes: (template == ReceiptTemplate::Detailed).then(|| order.notes.clone()).flatten(),
        footer: settings.receipt_footer.clone(),
        qr_payload: (template != ReceiptTemplate::Compact).then(|| order.id.to_string()),
        compact: template == ReceiptTemplate::Compact,
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::DocumentError(e.to_string())
}

fn money(currency: &str, value: Decimal) -> String {
    format!("{} {:.2}", currency, value)
}

/// Renderiza o recibo em memória. As fontes vêm de `fonts_dir` (família "Roboto").
pub fn render_receipt(receipt: &Receipt, fonts_dir: &str) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|e| AppError::DocumentError(format!("Fonts not found in {}: {}", fonts_dir, e)))?;

    let (title_size, body_size) = if receipt.compact { (12, 8) } else { (18, 10) };

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(receipt.reference.clone());
    doc.set_font_size(body_size);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(elements::Paragraph::new(receipt.store_name.clone()).styled(style::Style::new().bold().with_font_size(title_size)));
    if let Some(header) = &receipt.header {
        doc.push(elements::Paragraph::new(header.clone()));
    }
    doc.push(elements::Break::new(1));
    doc.push(elements::Paragraph::new(receipt.reference.clone()).styled(style::Style::new().bold()));
    doc.push(elements::Paragraph::new(receipt.issued_at.clone()));
    doc.push(elements::Break::new(1));

    // --- ITENS ---
    let style_bold = style::Style::new().bold();
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(false, true, false));
    table
        .row()
        .element(elements::Paragraph::new("Item").styled(style_bold))
        .element(elements::Paragraph::new("Qty").styled(style_bold))
        .element(elements::Paragraph::new("Price").styled(style_bold))
        .element(elements::Paragraph::new("Total").styled(style_bold))
        .push()
        .map_err(pdf_error)?;

    for line in &receipt.lines {
        table
            .row()
            .element(elements::Paragraph::new(line.description.clone()))
            .element(elements::Paragraph::new(line.quantity.to_string()))
            .element(elements::Paragraph::new(money(&receipt.currency, line.unit_price)))
            .element(elements::Paragraph::new(money(&receipt.currency, line.total)))
            .push()
            .map_err(pdf_error)?;
    }
    doc.push(table);
    doc.push(elements::Break::new(1));

    // --- TOTAIS ---
    let mut totals = vec![format!("Subtotal: {}", money(&receipt.currency, receipt.subtotal))];
    if !receipt.discount.is_zero() {
        totals.push(format!("Discount: -{}", money(&receipt.currency, receipt.discount)));
    }
    if let Some(tax) = receipt.tax {
        totals.push(format!("Tax: {}", money(&receipt.currency, tax)));
    }
    for text in totals {
        let mut p = elements::Paragraph::new(text);
        p.set_alignment(Alignment::Right);
        doc.push(p);
    }
    let mut total = elements::Paragraph::new(format!("TOTAL: {}", money(&receipt.currency, receipt.total)));
    total.set_alignment(Alignment::Right);
    doc.push(total.styled(style::Style::new().bold().with_font_size(title_size)));

    if let Some(method) = &receipt.payment_method {
        doc.push(elements::Paragraph::new(format!("Payment: {}", method)));
    }
    if let Some(notes) = &receipt.notes {
        doc.push(elements::Paragraph::new(format!("Notes: {}", notes)).styled(style::Style::new().italic()));
    }

    // --- QR CODE (id do pedido, para consulta no balcão) ---
    if let Some(payload) = &receipt.qr_payload {
        let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(elements::Break::new(1));
        doc.push(pdf_image);
    }

    // --- RODAPÉ ---
    if let Some(footer) = &receipt.footer {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(footer.clone()).styled(style::Style::new().italic().with_font_size(8)));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[derive(Clone)]
pub struct DocumentService {
    order_repo: OrderRepository,
    settings_repo: SettingsRepository,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(order_repo: OrderRepository, settings_repo: SettingsRepository, fonts_dir: String) -> Self {
        Self { order_repo, settings_repo, fonts_dir }
    }

    pub async fn order_receipt_pdf(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        tenant: &Tenant,
        order_id: Uuid,
    ) -> Result<Vec<u8>, AppError> {
        let order = self
            .order_repo
            .get_order(&mut *conn, scope, order_id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;
        let settings = self.settings_repo.get_or_create(&mut *conn, scope).await?;

        let receipt = build_receipt(tenant, &settings, &order);
        let fonts_dir = self.fonts_dir.clone();

        // genpdf é síncrono e pesado; sai do runtime.
        tokio::task::spawn_blocking(move || render_receipt(&receipt, &fonts_dir))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::types::Json;

    use super::*;
    use crate::models::{
        orders::{OrderItem, OrderStatus},
        settings::{BarcodeFormat, BarcodePrefixStrategy},
        tenancy::{SubscriptionStatus, SubscriptionTier, TenantStatus},
    };

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tenant() -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Padaria Central".into(),
            slug: "padaria-central".into(),
            subscription_tier: SubscriptionTier::Free,
            subscription_status: SubscriptionStatus::Active,
            status: TenantStatus::Active,
            email: None,
            phone: None,
            address: None,
            last_activity_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn settings(template: ReceiptTemplate, show_tax: bool) -> Settings {
        Settings {
            tenant_id: Uuid::new_v4(),
            currency: "BRL".into(),
            timezone: "UTC".into(),
            tax_rate: Decimal::ZERO,
            receipt_header: Some("Obrigado!".into()),
            receipt_footer: None,
            receipt_show_logo: false,
            receipt_show_tax: show_tax,
            receipt_template: template,
            barcode_format: BarcodeFormat::Code128,
            barcode_prefix_strategy: BarcodePrefixStrategy::None,
            barcode_prefix: None,
            barcode_next_sequence: 1,
            barcode_auto_generate: false,
            updated_at: Utc::now(),
        }
    }

    fn order() -> Order {
        let items = vec![
            OrderItem {
                product_id: Uuid::new_v4(),
                product_name: "Pão".into(),
                quantity: 3,
                price_at_time: dec("2.50"),
                item_type: OrderItemType::Sale,
            },
            OrderItem {
                product_id: Uuid::new_v4(),
                product_name: "Leite".into(),
                quantity: 1,
                price_at_time: dec("4.00"),
                item_type: OrderItemType::Return,
            },
        ];
        Order {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            customer_id: None,
            items: Json(items),
            subtotal: dec("3.50"),
            discount_amount: Decimal::ZERO,
            tax_amount: dec("0.30"),
            total_amount: dec("3.80"),
            payment_method: Some("cash".into()),
            status: OrderStatus::Completed,
            notes: Some("troco em moedas".into()),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn returned_lines_print_negative_totals() {
        let receipt = build_receipt(&tenant(), &settings(ReceiptTemplate::Standard, true), &order());
        assert_eq!(receipt.lines[0].total, dec("7.50"));
        assert_eq!(receipt.lines[1].total, dec("-4.00"));
        assert_eq!(receipt.lines[1].description, "Leite (return)");
    }

    #[test]
    fn tax_line_follows_settings() {
        let o = order();
        assert_eq!(build_receipt(&tenant(), &settings(ReceiptTemplate::Standard, true), &o).tax, Some(dec("0.30")));
        assert_eq!(build_receipt(&tenant(), &settings(ReceiptTemplate::Standard, false), &o).tax, None);
    }

    #[test]
    fn template_controls_notes_and_qr() {
        let o = order();
        let compact = build_receipt(&tenant(), &settings(ReceiptTemplate::Compact, true), &o);
        assert!(compact.compact);
        assert!(compact.qr_payload.is_none());
        assert!(compact.notes.is_none());

        let detailed = build_receipt(&tenant(), &settings(ReceiptTemplate::Detailed, true), &o);
        assert_eq!(detailed.qr_payload, Some(o.id.to_string()));
        assert_eq!(detailed.notes.as_deref(), Some("troco em moedas"));
    }

    #[test]
    fn missing_fonts_is_a_document_error() {
        let receipt = build_receipt(&tenant(), &settings(ReceiptTemplate::Standard, true), &order());
        assert!(matches!(
            render_receipt(&receipt, "/nonexistent/fonts"),
            Err(AppError::DocumentError(_))
        ));
    }
}
