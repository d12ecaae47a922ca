/// Appends `values` to `out` through `f`, inserting `separator` between the
/// pieces that actually produced output; a piece that appends nothing does
/// not earn a separator.
pub fn separated<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for value in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, value);
    }
}
