use apiguard_scanner::{CallConvention, SourceScanner, UnanalyzableReason};
use pretty_assertions::assert_eq;
use std::path::Path;

fn summary(
    scanner: &SourceScanner,
    path: &str,
    source: &str,
) -> Vec<(String, usize, Option<usize>)> {
    scanner
        .scan(Path::new(path), source)
        .unwrap()
        .call_sites
        .into_iter()
        .map(|s| (s.method, s.argument_count, s.line))
        .collect()
}

#[test]
fn vue_script_lines_are_file_lines() {
    let source = r#"<template>
  <el-button @click="api.fromTemplate()">Save</el-button>
</template>

<script>
import api from '@/api'

export default {
  methods: {
    load () {
      return api.getExamPaperList({ page: 1 })
    }
  }
}
</script>

<style scoped>
.api { color: red }
</style>
"#;
    let scanner = SourceScanner::new(CallConvention::default()).unwrap();
    assert_eq!(
        summary(&scanner, "src/views/Papers.vue", source),
        vec![("getExamPaperList".to_string(), 1, Some(11))]
    );
}

#[test]
fn vue_typescript_block() {
    let source = concat!(
        "<script setup lang=\"ts\">\n",
        "const page: number = 1\n",
        "await api.getUserList(page as number)\n",
        "</script>\n",
    );
    let scanner = SourceScanner::new(CallConvention::default()).unwrap();
    assert_eq!(
        summary(&scanner, "Users.vue", source),
        vec![("getUserList".to_string(), 1, Some(3))]
    );
}

#[test]
fn typescript_casts_and_assertions() {
    let source = "const rows: Tag[] = await api.getTagList({ page } as Query, opts!)\n";
    let scanner = SourceScanner::new(CallConvention::default()).unwrap();
    assert_eq!(
        summary(&scanner, "tags.ts", source),
        vec![("getTagList".to_string(), 2, Some(1))]
    );
}

#[test]
fn jsx_file() {
    let source = "const C = () => <Button onClick={() => api.deleteTag(id)} />\n";
    let scanner = SourceScanner::new(CallConvention::default()).unwrap();
    assert_eq!(
        summary(&scanner, "Tag.jsx", source),
        vec![("deleteTag".to_string(), 1, Some(1))]
    );
}

#[test]
fn custom_object_name() {
    let scanner = SourceScanner::new(CallConvention::member("http").unwrap()).unwrap();
    let source = "api.ignored()\nhttp.getUser(1, 2)\n";
    assert_eq!(
        summary(&scanner, "a.js", source),
        vec![("getUser".to_string(), 2, Some(2))]
    );
}

#[test]
fn wrapper_convention() {
    let scanner = SourceScanner::new(CallConvention::wrapper("ajax").unwrap()).unwrap();
    let source = r"
function getUserList (offset, limit) {
  return ajax('admin/user', 'get', { params: { offset, limit } })
}
function getContest (id) {
  return ajax(`admin/contest`, 'get', { params: { id } })
}
function dynamic (url) {
  return ajax(url, 'post')
}
function templated (id) {
  return ajax(`admin/contest/${id}`, 'get')
}
";
    let scan = scanner.scan(Path::new("admin/api.js"), source).unwrap();
    let sites: Vec<(&str, usize)> = scan
        .call_sites
        .iter()
        .map(|s| (s.method.as_str(), s.argument_count))
        .collect();
    assert_eq!(sites, vec![("admin/user", 3), ("admin/contest", 3)]);

    let reasons: Vec<UnanalyzableReason> = scan.unanalyzable.iter().map(|u| u.reason).collect();
    assert_eq!(
        reasons,
        vec![UnanalyzableReason::NonLiteralName, UnanalyzableReason::NonLiteralName]
    );
}

#[test]
fn wrapper_without_arguments() {
    let scanner = SourceScanner::new(CallConvention::wrapper("ajax").unwrap()).unwrap();
    let scan = scanner.scan(Path::new("a.js"), "ajax()").unwrap();
    assert!(scan.call_sites.is_empty());
    assert_eq!(scan.unanalyzable[0].reason, UnanalyzableReason::MissingName);
}

#[test]
fn custom_registry_markers() {
    let scanner = SourceScanner::new(CallConvention::default())
        .unwrap()
        .with_registry_markers("endpoints", ["resolveEndpoint"]);
    let via_module = "import { X } from './endpoints'\napi.getUser()";
    assert!(scanner.scan(Path::new("a.js"), via_module).unwrap().references_registry);
    let via_marker = "api[resolveEndpoint('users.list')]()";
    assert!(scanner.scan(Path::new("a.js"), via_marker).unwrap().references_registry);
    let default_module = "import m from './api-mapping'\napi.getUser()";
    assert!(!scanner.scan(Path::new("a.js"), default_module).unwrap().references_registry);
}
