//! Seeded randomized round-trip invariants for the stream codec.
//!
//! Chains are generated two ways: leaf-mutation chains compressed through
//! the update-only producer, and structural chains driven by random edit
//! scripts validated against the previous document's address table.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use base64::Engine;
use ciborium::value::Value;
use multibase::Base;
use plc_pack::{
    apply, compress_chain, decode, encode, to_cbor_bytes, DocIndex, EditScript, NodeKind, Slot,
};

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn range(&mut self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.next_u64() % n
        }
    }

    fn byte(&mut self) -> u8 {
        (self.next_u64() >> 32) as u8
    }
}

fn seeds() -> [u64; 16] {
    [
        0x5eed_c0de,
        0x0000_0001,
        0x0000_00ff,
        0x00c0_ffee,
        0x0123_4567_89ab_cdef,
        0x0000_1001,
        0x0000_2002,
        0x0000_3003,
        0x0000_4004,
        0x0000_5005,
        0xdead_beef,
        0xfeed_f00d,
        0x0bad_cafe,
        0x1234_5678,
        0x8765_4321,
        0xffff_ffff_ffff_ffff,
    ]
}

fn random_leaf(rng: &mut Lcg) -> Value {
    match rng.range(8) {
        0 => Value::Null,
        1 => Value::Bool(rng.range(2) == 1),
        2 => Value::Integer(((rng.range(200) as i64) - 50).into()),
        3 => Value::Text(format!("s{}", rng.range(1000))),
        4 => Value::Text(B64URL.encode(random_bytes(rng, 64))),
        5 => Value::Text(multibase::encode(Base::Base32Lower, random_bytes(rng, 36))),
        6 => Value::Text(format!(
            "did:key:z{}",
            bs58::encode(random_bytes(rng, 35)).into_string()
        )),
        _ => Value::Text(format!("at://host{}.example", rng.range(100))),
    }
}

fn random_bytes(rng: &mut Lcg, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.byte()).collect()
}

fn random_doc(rng: &mut Lcg, depth: usize) -> Value {
    if depth == 0 {
        return random_leaf(rng);
    }
    match rng.range(4) {
        0 => random_leaf(rng),
        1 => {
            let len = rng.range(4) as usize;
            Value::Array((0..len).map(|_| random_doc(rng, depth - 1)).collect())
        }
        _ => {
            let len = (1 + rng.range(4)) as usize;
            Value::Map(
                (0..len)
                    .map(|i| (Value::Text(format!("k{i}")), random_doc(rng, depth - 1)))
                    .collect(),
            )
        }
    }
}

/// Replace a handful of leaves in place, preserving shape.
fn mutate_leaves(rng: &mut Lcg, doc: &mut Value) {
    match doc {
        Value::Array(items) => {
            for item in items {
                mutate_leaves(rng, item);
            }
        }
        Value::Map(entries) => {
            for (_, value) in entries {
                mutate_leaves(rng, value);
            }
        }
        leaf => {
            if rng.range(3) == 0 {
                *leaf = random_leaf(rng);
            }
        }
    }
}

#[test]
fn leaf_mutation_chains_round_trip_for_seeded_docs() {
    for seed in seeds() {
        let mut rng = Lcg::new(seed);
        // Top level is always a map, as in a real operation.
        let mut op = Value::Map(vec![
            (Value::Text("type".to_string()), Value::Text("plc_operation".to_string())),
            (Value::Text("body".to_string()), random_doc(&mut rng, 3)),
        ]);
        let mut ops = vec![op.clone()];
        for _ in 0..4 {
            mutate_leaves(&mut rng, &mut op);
            ops.push(op.clone());
        }
        let compressed = compress_chain(&ops)
            .unwrap_or_else(|e| panic!("compress failed for seed {seed}: {e}"));
        let restored =
            decode(&compressed).unwrap_or_else(|e| panic!("decode failed for seed {seed}: {e}"));
        assert_eq!(restored.len(), ops.len(), "length mismatch seed={seed}");
        for (i, (orig, rest)) in ops.iter().zip(&restored).enumerate() {
            assert_eq!(
                to_cbor_bytes(orig).unwrap(),
                to_cbor_bytes(rest).unwrap(),
                "op {i} bytes mismatch seed={seed}"
            );
        }
    }
}

/// Build a random script legal against `doc`: a few updates on non-marker
/// nodes, deletes on markers/elements, appends, and prepends on elements.
fn random_script(rng: &mut Lcg, doc: &Value) -> EditScript {
    let index = DocIndex::build(doc);
    let mut script = EditScript::default();
    let mut used = std::collections::HashSet::new();
    for _ in 0..rng.range(3) {
        let idx = rng.range(index.len());
        let entry = *index.get(idx).unwrap();
        if entry.kind == NodeKind::EntryMarker || !used.insert(idx) {
            continue;
        }
        // Keys stay text to keep the document in the source domain.
        let replacement = if matches!(entry.slot, Slot::Key { .. }) {
            Value::Text(format!("renamed{}", rng.range(100)))
        } else {
            random_leaf(rng)
        };
        script.updates.push((idx, replacement));
    }
    for _ in 0..rng.range(3) {
        let idx = rng.range(index.len());
        let entry = index.get(idx).unwrap();
        if entry.is_deletable() && used.insert(idx) {
            script.deletes.push(idx);
        }
    }
    for _ in 0..rng.range(3) {
        let idx = rng.range(index.len());
        let entry = index.get(idx).unwrap();
        match entry.kind {
            NodeKind::Map => script.inserts.push((
                idx,
                Value::Array(vec![
                    Value::Text(format!("new{}", rng.range(100))),
                    random_leaf(rng),
                ]),
            )),
            NodeKind::Array => script.inserts.push((idx, random_leaf(rng))),
            _ => {}
        }
    }
    for _ in 0..rng.range(2) {
        let idx = rng.range(index.len());
        let entry = index.get(idx).unwrap();
        if matches!(entry.slot, Slot::Element { .. }) && !used.contains(&idx) {
            script.prepends.push((idx, random_leaf(rng)));
        }
    }
    script
}

#[test]
fn structural_script_chains_round_trip_for_seeded_docs() {
    for seed in seeds() {
        let mut rng = Lcg::new(seed);
        let mut prev = Value::Map(
            (0..2 + rng.range(3))
                .map(|i| (Value::Text(format!("k{i}")), random_doc(&mut rng, 2)))
                .collect(),
        );
        let mut ops = vec![prev.clone()];
        let mut scripts = Vec::new();
        for _ in 0..5 {
            let script = random_script(&mut rng, &prev);
            let next = apply(&prev, &script)
                .unwrap_or_else(|e| panic!("apply failed for seed {seed}: {e}"));
            scripts.push(script);
            ops.push(next.clone());
            prev = next;
        }
        let bytes = encode(&ops, &scripts)
            .unwrap_or_else(|e| panic!("encode failed for seed {seed}: {e}"));
        let restored =
            decode(&bytes).unwrap_or_else(|e| panic!("decode failed for seed {seed}: {e}"));
        for (i, (orig, rest)) in ops.iter().zip(&restored).enumerate() {
            assert_eq!(
                to_cbor_bytes(orig).unwrap(),
                to_cbor_bytes(rest).unwrap(),
                "op {i} bytes mismatch seed={seed}"
            );
        }
    }
}

#[test]
fn empty_script_is_identity_for_seeded_docs() {
    for seed in seeds() {
        let mut rng = Lcg::new(seed);
        let doc = random_doc(&mut rng, 3);
        assert_eq!(
            apply(&doc, &EditScript::default()).unwrap(),
            doc,
            "identity law failed seed={seed}"
        );
    }
}
