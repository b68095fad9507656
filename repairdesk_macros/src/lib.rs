use proc_macro::TokenStream;

mod keyed;

/// Derive `repairdesk::Keyed` for a record struct.
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Clone, Keyed)]
/// #[keyed(collection = "users")]
/// pub struct User {
///     #[keyed(id)]
///     #[serde(rename = "_id")]
///     pub id: String,
///     pub name: String,
/// }
/// ```
///
/// Without `collection`, the collection name is the snake_case struct name
/// plus `s`. Without a field marked `#[keyed(id)]`, a field named `id` is used.
#[proc_macro_derive(Keyed, attributes(keyed))]
pub fn derive_keyed(input: TokenStream) -> TokenStream {
    keyed::derive_keyed(input)
}
