//! Tests for [`RouterTree`] and [`Procedure`] signatures.

use itertools::Itertools;
use pretty_assertions::assert_eq;

use crate::{
    ir::{
        OperationKind, Procedure, RouterBranch, RouterEntry, RouterRecord, RouterTree, SegmentKey,
        resolve::ReferenceIndex,
    },
    parse::Method,
    tests::{assert_matches, doc},
};

fn build(yaml: &str) -> RouterTree {
    let doc = doc(yaml);
    let index = ReferenceIndex::new(&doc);
    RouterTree::build(&doc.paths, &index)
}

/// Renders the root's branch keys, in order.
fn root_keys(tree: &RouterTree) -> Vec<String> {
    tree.root
        .branches()
        .map(|branch| match &branch.key {
            SegmentKey::Literal(text) => text.clone(),
            SegmentKey::Param(name) => format!("[{name}]"),
        })
        .collect_vec()
}

fn only_branch(record: &RouterRecord) -> &RouterBranch {
    let branches = record.branches().collect_vec();
    let [branch] = &*branches else {
        panic!("expected one branch; got {branches:?}");
    };
    branch
}

fn methods(record: &RouterRecord) -> Vec<Method> {
    record.procedures().map(|p| p.method).collect_vec()
}

// MARK: Grouping

#[test]
fn test_shared_first_segment_merges() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /users/{user_id}:
            get: {}
          /users:
            post: {}
    "});

    let [RouterEntry::Branch(RouterBranch { key, records })] = &*tree.root.entries else {
        panic!("expected one root branch; got {:?}", tree.root.entries);
    };
    assert_eq!(key, &SegmentKey::Literal("users".to_owned()));

    // `/users` sorts first, because it has fewer segments.
    let [shallow, deep] = &**records else {
        panic!("expected two intersected records; got {records:?}");
    };
    assert_eq!(methods(shallow), [Method::Post]);
    assert_matches!(
        &*deep.entries,
        [RouterEntry::Branch(RouterBranch { key: SegmentKey::Param(name), records })]
            if name == "user_id" && methods(&records[0]) == [Method::Get],
    );
}

#[test]
fn test_methods_of_one_path_share_a_record() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            delete: {}
            get: {}
            post: {}
    "});

    let branch = only_branch(&tree.root);
    let [record] = &*branch.records else {
        panic!("expected one record; got {:?}", branch.records);
    };
    assert_eq!(methods(record), [Method::Get, Method::Post, Method::Delete]);
}

#[test]
fn test_merge_only_compares_previous_path() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /a/c:
            get: {}
          /a:
            get: {}
          /b:
            get: {}
    "});

    // `/a/c` follows `/b` after sorting, so it starts a second `a` branch.
    assert_eq!(root_keys(&tree), ["a", "b", "a"]);
}

#[test]
fn test_deeper_shared_prefixes_are_not_merged() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /v1/pets/{id}:
            get: {}
          /v1/pets/search:
            get: {}
    "});

    let branch = only_branch(&tree.root);
    assert_eq!(branch.records.len(), 2);
    for record in &branch.records {
        // Each record carries its own `pets` chain.
        assert_matches!(
            &*record.entries,
            [RouterEntry::Branch(RouterBranch { key: SegmentKey::Literal(pets), .. })]
                if pets == "pets",
        );
    }
}

#[test]
fn test_path_without_methods_still_counts_as_previous() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /a:
            get: {}
          /b/x: {}
          /a/y:
            get: {}
    "});

    assert_eq!(root_keys(&tree), ["a", "a"]);
}

#[test]
fn test_root_path_attaches_to_root() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /health:
            get: {}
          /:
            get: {}
            head: {}
    "});

    assert_eq!(methods(&tree.root), [Method::Get, Method::Head]);
    assert_eq!(root_keys(&tree), ["health"]);
}

#[test]
fn test_parameter_key_requires_whole_segment() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /files/{name}.pdf:
            get: {}
    "});

    let branch = only_branch(&tree.root);
    assert_matches!(
        &*branch.records[0].entries,
        [RouterEntry::Branch(RouterBranch { key: SegmentKey::Literal(text), .. })]
            if text == "{name}.pdf",
    );
}

#[test]
fn test_empty_paths() {
    let tree = build("openapi: 3.1.0");
    assert_eq!(tree, RouterTree::default());
}

// MARK: Signatures

fn procedure(yaml: &str) -> Procedure {
    let tree = build(yaml);
    let mut record = &tree.root;
    while let Some(branch) = record.branches().next() {
        record = &branch.records[0];
    }
    record.procedures().next().unwrap().clone()
}

#[test]
fn test_operation_kinds() {
    let tree = build(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /:
            get: {}
            post: {}
            put: {}
            patch: {}
            delete: {}
            head: {}
            options: {}
    "});

    let kinds = tree
        .root
        .procedures()
        .map(|p| (p.method.as_str(), p.kind))
        .collect_vec();
    assert_eq!(
        kinds,
        [
            ("get", OperationKind::Query),
            ("post", OperationKind::Mutation),
            ("put", OperationKind::Mutation),
            ("patch", OperationKind::Mutation),
            ("delete", OperationKind::Mutation),
            ("head", OperationKind::Query),
            ("options", OperationKind::Query),
        ]
    );
}

#[test]
fn test_no_input_is_void() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            get:
              parameters:
                - name: id
                  in: path
                  required: true
                  schema:
                    type: string
    "});
    assert_eq!(procedure.input.to_string(), "void");
    assert_eq!(procedure.output.to_string(), "unknown");
}

#[test]
fn test_query_only_input() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            get:
              parameters:
                - name: limit
                  in: query
                  schema:
                    type: integer
                - name: kind
                  in: query
                  required: true
                  schema:
                    enum: [cat, dog]
                - name: raw
                  in: query
    "});
    assert_eq!(
        procedure.input.to_string(),
        "{ query: { limit?: number, kind: 'cat' | 'dog', raw?: unknown } }"
    );
}

#[test]
fn test_data_and_query_input() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            post:
              parameters:
                - name: dry_run
                  in: query
                  schema:
                    type: boolean
              requestBody:
                content:
                  application/json:
                    schema:
                      $ref: '#/components/schemas/NewPet'
                  text/plain:
                    schema:
                      type: string
        components:
          schemas:
            NewPet:
              type: object
              properties:
                name:
                  type: string
    "});
    assert_eq!(
        procedure.input.to_string(),
        "{ data: NewPet, query: { dry_run?: boolean } }"
    );
}

#[test]
fn test_non_json_body_is_ignored() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /upload:
            put:
              requestBody:
                content:
                  application/octet-stream:
                    schema:
                      type: string
    "});
    assert_eq!(procedure.input.to_string(), "void");
}

#[test]
fn test_output_unions_success_responses() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            get:
              responses:
                '200':
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/Pet'
                '202':
                  content:
                    application/json:
                      schema:
                        type: string
                '400':
                  content:
                    application/json:
                      schema:
                        $ref: '#/components/schemas/Error'
    "});
    assert_eq!(procedure.output.to_string(), "Pet | string");
}

#[test]
fn test_referenced_request_body_is_skipped() {
    let procedure = procedure(indoc::indoc! {"
        openapi: 3.1.0
        paths:
          /pets:
            post:
              requestBody:
                $ref: '#/components/requestBodies/NewPet'
    "});
    assert_eq!(procedure.input.to_string(), "void");
}
