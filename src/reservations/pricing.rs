use rust_decimal::Decimal;

/// Charged price of one ticket: `base * (1 - discount)`.
///
/// No currency rounding happens here; the `NUMERIC` column applies its own
/// scale on insert. `discount` is trusted to be in `[0, 1]`.
pub fn price(base: Decimal, discount: Decimal) -> Decimal {
    base * (Decimal::ONE - discount)
}
