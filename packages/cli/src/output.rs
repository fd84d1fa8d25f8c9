use common::cabin::Cabin;
use console::style;

/// Format cabins as an aligned text table.
pub fn cabin_table(cabins: &[Cabin]) -> String {
    if cabins.is_empty() {
        return "No cabins could be found.".to_string();
    }

    let name_width = cabins
        .iter()
        .map(|c| c.fields.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "{:>6}  {:<name_width$}  {:>8}  {:>8}  {:>8}  {}\n",
        "ID", "NAME", "CAPACITY", "PRICE", "DISCOUNT", "IMAGE"
    );
    for cabin in cabins {
        let discount = match cabin.fields.discount {
            0 => "-".to_string(),
            d => d.to_string(),
        };
        out.push_str(&format!(
            "{:>6}  {:<name_width$}  {:>8}  {:>8}  {:>8}  {}\n",
            cabin.id,
            cabin.fields.name,
            cabin.fields.max_capacity,
            cabin.fields.regular_price,
            discount,
            style(&cabin.image).dim()
        ));
    }
    out
}

pub fn cabin_summary(cabin: &Cabin) -> String {
    format!(
        "#{} {} (fits up to {} guests, {} per night)",
        cabin.id, cabin.fields.name, cabin.fields.max_capacity, cabin.fields.regular_price
    )
}
