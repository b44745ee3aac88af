use crate::collection::Collection;
use crate::document::{Document, ID_FIELD};
use crate::errors::DbError;
use crate::types::DocumentId;
use bson::{Bson, Document as BsonDocument};
use std::time::Instant;

use super::eval::{as_f64, compare_docs, eval_with_text, get_path};
use super::types::{DeleteReport, Filter, FindOptions, MAX_SORT_FIELDS, UpdateDoc, UpdateReport};

fn text_fields_for(col: &Collection, filter: &Filter) -> Result<Vec<String>, DbError> {
    if !filter.uses_text() {
        return Ok(Vec::new());
    }
    let fields = col.text_fields();
    if fields.is_empty() {
        return Err(DbError::QueryError(format!("text search requires a text index on '{}'", col.name())));
    }
    Ok(fields)
}

fn bench(op: &str, col: &Collection, started: Instant, result_count: usize) {
    log::trace!(
        target: "estatelite::query",
        "{{\"bench\":\"query\",\"op\":\"{op}\",\"collection\":\"{}\",\"duration_us\":{},\"result_count\":{result_count}}}",
        col.name(),
        started.elapsed().as_micros()
    );
}

/// Returns the matching documents, sorted and sliced per `opts`.
///
/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn find_docs(col: &Collection, filter: &Filter, opts: &FindOptions) -> Result<Vec<Document>, DbError> {
    let started = Instant::now();
    let text_fields = text_fields_for(col, filter)?;
    let mut docs: Vec<Document> = col
        .docs
        .read()
        .values()
        .filter(|d| eval_with_text(&d.data, filter, &text_fields))
        .cloned()
        .collect();

    if let Some(sort) = &opts.sort {
        if sort.len() > MAX_SORT_FIELDS {
            log::warn!("sort spec too long: {}", sort.len());
        }
        docs.sort_by(|a, b| compare_docs(&a.data, &b.data, sort));
    }

    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX);
    let docs: Vec<Document> = docs.into_iter().skip(skip).take(limit).collect();
    bench("find", col, started, docs.len());
    Ok(docs)
}

/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn find_one(col: &Collection, filter: &Filter) -> Result<Option<Document>, DbError> {
    let text_fields = text_fields_for(col, filter)?;
    Ok(col.docs.read().values().find(|d| eval_with_text(&d.data, filter, &text_fields)).cloned())
}

/// Inserts `doc` unless some stored document already matches `conflict`. The check and the
/// insert share one write lock. Returns the new id, or `None` when a match blocked the insert.
///
/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn insert_unless(col: &Collection, conflict: &Filter, doc: Document) -> Result<Option<DocumentId>, DbError> {
    let text_fields = text_fields_for(col, conflict)?;
    let mut docs = col.docs.write();
    if docs.values().any(|d| eval_with_text(&d.data, conflict, &text_fields)) {
        return Ok(None);
    }
    let id = doc.id.clone();
    docs.insert(id.clone(), doc);
    drop(docs);
    log::debug!("insert {}/{id}", col.name());
    Ok(Some(id))
}

/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn count_docs(col: &Collection, filter: &Filter) -> Result<usize, DbError> {
    let started = Instant::now();
    let text_fields = text_fields_for(col, filter)?;
    let n = col.docs.read().values().filter(|d| eval_with_text(&d.data, filter, &text_fields)).count();
    bench("count", col, started, n);
    Ok(n)
}

/// Sums the numeric values found at `path` over the matching documents. Non-numeric values
/// and missing fields contribute nothing.
///
/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn sum_field(col: &Collection, filter: &Filter, path: &str) -> Result<f64, DbError> {
    let text_fields = text_fields_for(col, filter)?;
    Ok(col
        .docs
        .read()
        .values()
        .filter(|d| eval_with_text(&d.data, filter, &text_fields))
        .filter_map(|d| get_path(&d.data, path).and_then(as_f64))
        .sum())
}

/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn update_many(col: &Collection, filter: &Filter, update: &UpdateDoc) -> Result<UpdateReport, DbError> {
    let started = Instant::now();
    let text_fields = text_fields_for(col, filter)?;
    let mut report = UpdateReport::default();
    for doc in col.docs.write().values_mut() {
        if eval_with_text(&doc.data, filter, &text_fields) {
            report.matched += 1;
            if apply_update(doc, update) {
                report.modified += 1;
            }
        }
    }
    bench("update_many", col, started, usize::try_from(report.matched).unwrap_or(usize::MAX));
    Ok(report)
}

/// Updates the first matching document. Match and update happen under a single write lock.
///
/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn update_one(col: &Collection, filter: &Filter, update: &UpdateDoc) -> Result<UpdateReport, DbError> {
    let text_fields = text_fields_for(col, filter)?;
    let mut docs = col.docs.write();
    if let Some(doc) = docs.values_mut().find(|d| eval_with_text(&d.data, filter, &text_fields)) {
        let changed = apply_update(doc, update);
        return Ok(UpdateReport { matched: 1, modified: u64::from(changed) });
    }
    Ok(UpdateReport::default())
}

/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn delete_many(col: &Collection, filter: &Filter) -> Result<DeleteReport, DbError> {
    let started = Instant::now();
    let text_fields = text_fields_for(col, filter)?;
    let mut docs = col.docs.write();
    let before = docs.len();
    docs.retain(|_, d| !eval_with_text(&d.data, filter, &text_fields));
    let deleted = before - docs.len();
    drop(docs);
    bench("delete_many", col, started, deleted);
    Ok(DeleteReport { deleted: deleted as u64 })
}

/// # Errors
/// Fails when the filter needs a text index the collection does not have.
pub fn delete_one(col: &Collection, filter: &Filter) -> Result<DeleteReport, DbError> {
    let text_fields = text_fields_for(col, filter)?;
    let mut docs = col.docs.write();
    let target = docs.iter().find(|(_, d)| eval_with_text(&d.data, filter, &text_fields)).map(|(id, _)| id.clone());
    let deleted = target.and_then(|id| docs.remove(&id)).is_some();
    Ok(DeleteReport { deleted: u64::from(deleted) })
}

/// Applies `upd` to `doc` in place; returns whether anything changed. `_id` is never touched.
pub fn apply_update(doc: &mut Document, upd: &UpdateDoc) -> bool {
    fn ensure_subdoc<'a>(root: &'a mut BsonDocument, key: &str) -> &'a mut BsonDocument {
        if !matches!(root.get(key), Some(Bson::Document(_))) {
            root.insert(key.to_string(), Bson::Document(BsonDocument::new()));
        }
        match root.get_mut(key) {
            Some(Bson::Document(d)) => d,
            _ => unreachable!(),
        }
    }
    fn traverse_to_parent<'a>(root: &'a mut BsonDocument, path: &str) -> (&'a mut BsonDocument, String) {
        let mut cur = root;
        let mut iter = path.split('.').peekable();
        let mut last = String::new();
        while let Some(seg) = iter.next() {
            if iter.peek().is_none() {
                last = seg.to_string();
                break;
            }
            cur = ensure_subdoc(cur, seg);
        }
        (cur, last)
    }
    fn set_path(root: &mut BsonDocument, path: &str, value: Bson) -> bool {
        let (parent, last) = traverse_to_parent(root, path);
        let old = parent.insert(last, value.clone());
        old.as_ref() != Some(&value)
    }
    // Integers stay integers; anything involving a double becomes a double.
    fn inc_value(cur: Option<&Bson>, by: &Bson) -> Bson {
        match (cur, by) {
            (None | Some(Bson::Int32(_) | Bson::Int64(_)), Bson::Int32(_) | Bson::Int64(_)) => {
                let base = match cur {
                    Some(Bson::Int32(i)) => i64::from(*i),
                    Some(Bson::Int64(i)) => *i,
                    _ => 0,
                };
                let step = match by {
                    Bson::Int32(i) => i64::from(*i),
                    Bson::Int64(i) => *i,
                    _ => 0,
                };
                Bson::Int64(base.saturating_add(step))
            }
            _ => Bson::Double(cur.and_then(as_f64).unwrap_or(0.0) + as_f64(by).unwrap_or(0.0)),
        }
    }
    fn array_at<'a>(root: &'a mut BsonDocument, path: &str) -> &'a mut Vec<Bson> {
        let (parent, last) = traverse_to_parent(root, path);
        if !matches!(parent.get(&last), Some(Bson::Array(_))) {
            parent.insert(last.clone(), Bson::Array(Vec::new()));
        }
        match parent.get_mut(&last) {
            Some(Bson::Array(a)) => a,
            _ => unreachable!(),
        }
    }

    let root = &mut doc.data;
    let mut changed = false;
    for (k, v) in upd.set.iter().filter(|(k, _)| k != ID_FIELD) {
        changed |= set_path(root, k, v.clone());
    }
    for (k, by) in upd.inc.iter().filter(|(k, _)| k != ID_FIELD) {
        let next = inc_value(get_path(root, k), by);
        changed |= set_path(root, k, next);
    }
    for (k, v) in &upd.add_to_set {
        let arr = array_at(root, k);
        if !arr.contains(v) {
            arr.push(v.clone());
            changed = true;
        }
    }
    for (k, v) in &upd.pull {
        if matches!(get_path(root, k), Some(Bson::Array(_))) {
            let arr = array_at(root, k);
            let before = arr.len();
            arr.retain(|x| x != v);
            changed |= arr.len() != before;
        }
    }
    changed
}
