//! Checkout handoff
//!
//! Checkout does not process payment. The client assembles the cart and the
//! delivery address into a pre-filled WhatsApp message and hands the order
//! off through a `wa.me` deep link; opening the link is the embedder's job.

use rust_decimal::Decimal;

use crate::addresses::Address;
use crate::auth::User;
use crate::cart::CartItem;
use crate::error::Error;
use crate::fetch::ApiClient;

/// Flat shipping fee in BRL
const SHIPPING_FEE_CENTS: i64 = 1500;

/// Everything the checkout flow needs, fetched in one call
#[derive(Debug, Clone)]
pub struct CheckoutData {
    /// Current cart lines
    pub items: Vec<CartItem>,

    /// The user's addresses
    pub addresses: Vec<Address>,

    /// Preselected address: the default one, or the first
    pub selected: Option<Address>,
}

/// Order totals
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: Decimal,

    /// Flat shipping fee
    pub shipping: Decimal,

    /// Subtotal plus shipping
    pub total: Decimal,
}

fn brl(value: Decimal) -> String {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Client for the checkout flow
pub struct CheckoutClient {
    api: ApiClient,
    store_phone: String,
}

impl CheckoutClient {
    /// Create a new CheckoutClient
    pub(crate) fn new(api: ApiClient, store_phone: String) -> Self {
        Self { api, store_phone }
    }

    /// Fetch the cart and addresses for the checkout screen.
    ///
    /// A missing address endpoint yields an empty address list, not an
    /// error; the cart fetch is mandatory.
    pub async fn load(&self) -> Result<CheckoutData, Error> {
        let cart = self.api.get("/cart/").execute::<crate::cart::Cart>().await?;

        let addresses = match self.api.get("/addresses/").execute::<Vec<Address>>().await {
            Ok(addresses) => addresses,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err),
        };

        let selected = addresses
            .iter()
            .find(|address| address.is_default)
            .or_else(|| addresses.first())
            .cloned();

        Ok(CheckoutData {
            items: cart.items,
            addresses,
            selected,
        })
    }

    /// Compute order totals with the flat shipping fee
    pub fn totals(&self, items: &[CartItem]) -> Totals {
        let subtotal: Decimal = items
            .iter()
            .map(|item| item.perfume.price * Decimal::from(item.quantity))
            .sum();
        let shipping = Decimal::new(SHIPPING_FEE_CENTS, 2);
        Totals {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Build the pre-filled order message.
    ///
    /// Fails when the cart is empty or no address was selected.
    pub fn order_message(
        &self,
        user: Option<&User>,
        items: &[CartItem],
        address: &Address,
    ) -> Result<String, Error> {
        if items.is_empty() {
            return Err(Error::validation("cart is empty"));
        }

        let totals = self.totals(items);

        let items_text = items
            .iter()
            .map(|item| {
                format!(
                    "• {}\n  Quantidade: {}\n  Preço unitário: R$ {}\n  Subtotal: R$ {}",
                    item.perfume.name,
                    item.quantity,
                    brl(item.perfume.price),
                    brl(item.perfume.price * Decimal::from(item.quantity)),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let complement = address
            .complement
            .as_deref()
            .map(|c| format!(", {}", c))
            .unwrap_or_default();
        let address_text = format!(
            "📦 *ENDEREÇO DE ENTREGA:*\n{}\n{}, {}{}\n{}, {} - {}\nCEP: {}",
            address.name,
            address.street,
            address.number,
            complement,
            address.neighborhood,
            address.city,
            address.state,
            address.zip_code,
        );

        let customer_name = user
            .map(|u| u.display_name.clone().unwrap_or_else(|| u.username.clone()))
            .unwrap_or_else(|| "Cliente".to_string());
        let customer_email = user.map(|u| u.email.clone()).unwrap_or_default();

        Ok(format!(
            "🛍️ *NOVO PEDIDO - PERFUMARIA LEDO*\n\n\
             👤 *CLIENTE:*\n{}\n{}\n\n\
             📋 *ITENS DO PEDIDO:*\n{}\n\n\
             💰 *RESUMO DO PEDIDO:*\nSubtotal: R$ {}\nFrete: R$ {}\n*TOTAL: R$ {}*\n\n\
             {}\n\n\
             💬 *INFORMAÇÕES ADICIONAIS:*\n\
             Por favor, confirme o pedido e informe as formas de pagamento disponíveis.",
            customer_name,
            customer_email,
            items_text,
            brl(totals.subtotal),
            brl(totals.shipping),
            brl(totals.total),
            address_text,
        ))
    }

    /// Build the `wa.me` deep link carrying the order message
    pub fn whatsapp_link(&self, message: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.store_phone,
            urlencoding::encode(message)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;
    use crate::catalog::Perfume;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    fn client() -> CheckoutClient {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
        let api = ApiClient::new(
            "http://127.0.0.1:8000/api".to_string(),
            reqwest::Client::new(),
            session,
        );
        CheckoutClient::new(api, "5511999999999".to_string())
    }

    fn item(price_cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: 1,
            perfume: Perfume {
                id: 1,
                name: "Amber Noir".to_string(),
                description: String::new(),
                price: Decimal::new(price_cents, 2),
                brand: None,
                image: None,
                in_stock: true,
                created_at: None,
            },
            quantity,
            total_price: Decimal::new(price_cents * i64::from(quantity), 2),
        }
    }

    fn address() -> Address {
        Address {
            id: 1,
            name: "Casa".to_string(),
            street: "Rua das Flores".to_string(),
            number: "123".to_string(),
            complement: Some("Apto 101".to_string()),
            neighborhood: "Centro".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "01234-567".to_string(),
            is_default: true,
        }
    }

    #[test]
    fn totals_apply_flat_shipping() {
        let checkout = client();
        let totals = checkout.totals(&[item(9990, 2)]);
        assert_eq!(totals.subtotal, Decimal::new(19980, 2));
        assert_eq!(totals.shipping, Decimal::new(1500, 2));
        assert_eq!(totals.total, Decimal::new(21480, 2));
    }

    #[test]
    fn message_includes_items_totals_and_address() {
        let checkout = client();
        let message = checkout
            .order_message(None, &[item(9990, 1)], &address())
            .unwrap();

        assert!(message.contains("NOVO PEDIDO - PERFUMARIA LEDO"));
        assert!(message.contains("Amber Noir"));
        assert!(message.contains("Subtotal: R$ 99.90"));
        assert!(message.contains("*TOTAL: R$ 114.90*"));
        assert!(message.contains("Rua das Flores, 123, Apto 101"));
        assert!(message.contains("CEP: 01234-567"));
    }

    #[test]
    fn empty_cart_fails_validation() {
        let checkout = client();
        assert!(matches!(
            checkout.order_message(None, &[], &address()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn link_is_percent_encoded() {
        let checkout = client();
        let link = checkout.whatsapp_link("pedido #1 à vista");
        assert!(link.starts_with("https://wa.me/5511999999999?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('#'));
    }
}
