use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, SortSpec};

/// Evaluates `filter` against `doc` with no text index. `Filter::Text` never matches here.
pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    eval_with_text(doc, filter, &[])
}

/// Evaluates `filter` against `doc`, resolving `Filter::Text` over `text_fields`.
pub fn eval_with_text(doc: &BsonDocument, filter: &Filter, text_fields: &[String]) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_with_text(doc, f, text_fields)),
        Filter::Or(fs) => fs.iter().any(|f| eval_with_text(doc, f, text_fields)),
        Filter::Not(f) => !eval_with_text(doc, f, text_fields),
        Filter::Cmp { path, op, value } => get_path(doc, path).is_some_and(|v| match op {
            // Equality also matches an array holding the value.
            CmpOp::Eq => {
                bson_eq(v, value)
                    || matches!(v, Bson::Array(items) if items.iter().any(|i| bson_eq(i, value)))
            }
            CmpOp::Gt => comparable(v, value) && compare_bson(v, value) == Ordering::Greater,
            CmpOp::Gte => comparable(v, value) && compare_bson(v, value) != Ordering::Less,
            CmpOp::Lt => comparable(v, value) && compare_bson(v, value) == Ordering::Less,
            CmpOp::Lte => comparable(v, value) && compare_bson(v, value) != Ordering::Greater,
        }),
        Filter::All { path, values } => match get_path(doc, path) {
            Some(Bson::Array(items)) => {
                !values.is_empty() && values.iter().all(|want| items.iter().any(|have| have == want))
            }
            Some(scalar) => !values.is_empty() && values.iter().all(|want| scalar == want),
            None => false,
        },
        Filter::Regex { path, regex } => {
            matches!(get_path(doc, path), Some(Bson::String(s)) if regex.is_match(s))
        }
        Filter::Text { query } => text_match(doc, query, text_fields),
    }
}

/// Orders two documents by the given sort keys. Missing fields sort before present ones.
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let ord = match (get_path(a, &s.field), get_path(b, &s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').peekable();
    let mut segs = 0usize;
    while let Some(part) = parts.next() {
        segs += 1;
        if segs > MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    a == b || matches!((as_f64(a), as_f64(b)), (Some(x), Some(y)) if x == y)
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

pub(crate) fn as_f64(x: &Bson) -> Option<f64> {
    match x {
        Bson::Int32(i) => Some(f64::from(*i)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

// Range operators only compare like with like (numbers with numbers, strings with strings).
fn comparable(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b)) || type_rank(a) == type_rank(b)
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::Null | Bson::Undefined => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 1,
        Bson::String(_) | Bson::Symbol(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) => 8,
        Bson::Timestamp(_) => 9,
        Bson::RegularExpression(_) => 10,
        _ => 11,
    }
}

/// Lowercased alphanumeric terms of `s`.
pub(crate) fn terms(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(str::to_lowercase)
}

fn text_match(doc: &BsonDocument, query: &str, text_fields: &[String]) -> bool {
    let wanted: Vec<String> = terms(query).collect();
    if wanted.is_empty() {
        return false;
    }
    text_fields.iter().any(|field| match get_path(doc, field) {
        Some(Bson::String(s)) => terms(s).any(|t| wanted.contains(&t)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn nested_paths_resolve() {
        let d = doc! {"features": {"area": 120.5}, "flat": 1};
        assert_eq!(get_path(&d, "features.area"), Some(&Bson::Double(120.5)));
        assert!(get_path(&d, "flat.nope").is_none());
        assert!(get_path(&d, "").is_none());
    }

    #[test]
    fn range_ops_do_not_cross_types() {
        let d = doc! {"price": "cheap"};
        let f = Filter::cmp("price", CmpOp::Lte, 100);
        assert!(!eval_filter(&d, &f));
    }

    #[test]
    fn text_requires_declared_fields() {
        let d = doc! {"title": "Sunny loft downtown"};
        let f = Filter::Text { query: "LOFT".into() };
        assert!(!eval_filter(&d, &f));
        assert!(eval_with_text(&d, &f, &["title".to_string()]));
        assert!(!eval_with_text(&d, &Filter::Text { query: "lof".into() }, &["title".to_string()]));
    }
}
