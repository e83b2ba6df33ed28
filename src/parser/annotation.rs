//! Compound annotation codec.
//!
//! Genome rows carry regulator provenance in their attribute column:
//!
//! ```text
//! ID=gene01.01;regulator=PARCLIP#scifi*scifi_cds~PICTAR#fake01*fake01_cds;score=5~7;start=250~255;end=260~265
//! ```
//!
//! `;` separates attributes, `=` keys from values, `~` the entries of the
//! regulator/score/start/end sublists and `#`/`*` the parts of a regulator
//! tag. Inside the crate the same information lives in a
//! [`CompoundAnnotation`]; this module is the only place that touches the
//! text form.

use indexmap::IndexMap;

use crate::error::{DorinaError, Result};
use crate::types::{AnnotatedFeature, CompoundAnnotation, GffRecord, RegulatorMatch, RegulatorTag};

/// Characters that may never appear inside an identifier.
pub const RESERVED: [char; 5] = [';', '=', '~', '#', '*'];

/// Attribute keys owned by the compound annotation.
pub const ANNOTATION_KEYS: [&str; 4] = ["regulator", "score", "start", "end"];

/// Decode `key=value;key=value` into an ordered map.
///
/// Empty pieces (e.g. a trailing `;`) are skipped.
pub fn decode(text: &str) -> Result<IndexMap<String, String>> {
    let mut map = IndexMap::new();

    for piece in text.split(';') {
        if piece.is_empty() {
            continue;
        }
        let (key, value) = piece.split_once('=').ok_or_else(|| {
            DorinaError::Parse(format!("attribute without '=': {:?}", piece))
        })?;
        if value.contains('=') {
            return Err(DorinaError::Parse(format!(
                "attribute with more than one '=': {:?}",
                piece
            )));
        }
        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

/// Encode an ordered map back into attribute text.
pub fn encode(map: &IndexMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(";")
}

/// Decode a `~`-separated list of `source#track*site` tags.
pub fn decode_regulator_list(raw: &str) -> Result<Vec<RegulatorTag>> {
    raw.split('~').map(decode_tag).collect()
}

fn decode_tag(raw: &str) -> Result<RegulatorTag> {
    let (data_source, rest) = raw
        .split_once('#')
        .ok_or_else(|| DorinaError::Parse(format!("regulator without '#': {:?}", raw)))?;
    let (track, site) = rest
        .split_once('*')
        .ok_or_else(|| DorinaError::Parse(format!("regulator without '*': {:?}", raw)))?;

    for part in [data_source, track, site] {
        check_identifier(part)?;
    }

    Ok(RegulatorTag::new(data_source, track, site))
}

/// Encode tags as a `~`-separated list.
pub fn encode_regulator_list<'a, I>(tags: I) -> Result<String>
where
    I: IntoIterator<Item = &'a RegulatorTag>,
{
    let mut parts = Vec::new();
    for tag in tags {
        check_identifier(&tag.data_source)?;
        check_identifier(&tag.track)?;
        check_identifier(&tag.site)?;
        parts.push(tag.to_string());
    }
    Ok(parts.join("~"))
}

/// Fail when an identifier holds one of the grammar's delimiters.
pub fn check_identifier(s: &str) -> Result<()> {
    if let Some(c) = s.chars().find(|c| RESERVED.contains(c)) {
        return Err(DorinaError::Parse(format!(
            "identifier {:?} contains reserved delimiter {:?}",
            s, c
        )));
    }
    Ok(())
}

fn decode_int_list(key: &str, raw: &str) -> Result<Vec<i64>> {
    raw.split('~')
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| DorinaError::Parse(format!("{}: not an integer: {:?}", key, v)))
        })
        .collect()
}

fn join_ints(values: impl Iterator<Item = i64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join("~")
}

/// Build a compound annotation from decoded attributes.
pub fn decode_annotation(map: &IndexMap<String, String>) -> Result<CompoundAnnotation> {
    let field = |key: &str| {
        map.get(key)
            .ok_or_else(|| DorinaError::Format(format!("missing '{}' attribute", key)))
    };

    let tags = decode_regulator_list(field("regulator")?)?;
    let scores = decode_int_list("score", field("score")?)?;
    let starts = decode_int_list("start", field("start")?)?;
    let ends = decode_int_list("end", field("end")?)?;

    let n = tags.len();
    if scores.len() != n || starts.len() != n || ends.len() != n {
        return Err(DorinaError::Format(format!(
            "sublist lengths differ: regulator={}, score={}, start={}, end={}",
            n,
            scores.len(),
            starts.len(),
            ends.len()
        )));
    }

    let matches = tags
        .into_iter()
        .zip(scores)
        .zip(starts.into_iter().zip(ends))
        .map(|((tag, score), (start, end))| RegulatorMatch {
            tag,
            score,
            start,
            end,
        })
        .collect();

    Ok(CompoundAnnotation::new(matches))
}

/// Encode a compound annotation as its four attributes.
pub fn encode_annotation(annotation: &CompoundAnnotation) -> Result<String> {
    if annotation.is_empty() {
        return Err(DorinaError::Format(
            "cannot encode an empty annotation".to_string(),
        ));
    }

    Ok(format!(
        "regulator={};score={};start={};end={}",
        encode_regulator_list(annotation.tags())?,
        join_ints(annotation.iter().map(|m| m.score)),
        join_ints(annotation.iter().map(|m| m.start)),
        join_ints(annotation.iter().map(|m| m.end)),
    ))
}

/// The gene identifier (`ID` attribute) of a genome row.
pub fn gene_id(attributes: &str) -> Result<String> {
    decode(attributes)?
        .shift_remove("ID")
        .ok_or_else(|| DorinaError::Format(format!("missing 'ID' attribute: {:?}", attributes)))
}

/// Full attribute text of an annotated feature.
pub fn encode_feature_attributes(feature: &AnnotatedFeature) -> Result<String> {
    let mut own = decode(&feature.feature.attributes)?;
    for key in ANNOTATION_KEYS {
        own.shift_remove(key);
    }
    let annotation = encode_annotation(&feature.annotation)?;

    if own.is_empty() {
        Ok(annotation)
    } else {
        Ok(format!("{};{}", encode(&own), annotation))
    }
}

/// Rebuild an annotated feature from a row carrying encoded provenance.
///
/// The consensus bounds are folded from the matches. The consensus score is
/// taken from the score column when it holds an integer, since nested merges
/// do not fold back to the same average.
pub fn decode_feature(mut feature: GffRecord) -> Result<AnnotatedFeature> {
    let mut map = decode(&feature.attributes)?;
    let gene = map.get("ID").cloned().ok_or_else(|| {
        DorinaError::Format(format!("missing 'ID' attribute: {:?}", feature.attributes))
    })?;
    let annotation = decode_annotation(&map)?;
    let mut consensus = annotation
        .consensus()
        .ok_or_else(|| DorinaError::Format("empty regulator list".to_string()))?;
    if let Ok(score) = feature.score.parse::<i64>() {
        consensus.score = score;
    }

    for key in ANNOTATION_KEYS {
        map.shift_remove(key);
    }
    feature.attributes = encode(&map);

    Ok(AnnotatedFeature {
        feature,
        gene,
        annotation,
        consensus,
    })
}
