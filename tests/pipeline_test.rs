//! Integration tests for page processing and conversion.

use pdfknowledge::model::{BoundingBox, ContentType, RecordKind, TableRegion};
use pdfknowledge::parser::{OcrEngine, RasterImage, Rasterizer};
use pdfknowledge::{
    convert_batch, DocumentInfo, DocumentProcessor, Error, ExtractOptions, JsonPageSource,
    LayoutMode, OcrConfig, OcrPipeline, PageData, Result, TitleEntry, Word,
};

/// One line of words; tokens are spaced 60pt apart.
fn line(text: &str, top: f32) -> Vec<Word> {
    text.split(' ')
        .enumerate()
        .map(|(i, w)| {
            let x0 = 50.0 + i as f32 * 60.0;
            Word::new(w, x0, top, x0 + 50.0, top + 10.0)
        })
        .collect()
}

fn page(number: u32, lines: &[(&str, f32)]) -> PageData {
    PageData::a4(number).with_words(lines.iter().flat_map(|(t, top)| line(t, *top)).collect())
}

fn annual_report() -> JsonPageSource {
    JsonPageSource::from_pages(
        "/data/某某股份2023年年度报告.pdf",
        vec![
            page(
                1,
                &[
                    ("某某股份有限公司 2023年年度报告", 30.0),
                    ("§1重要提示", 100.0),
                    ("本公司 董事会 保证", 130.0),
                    ("1", 800.0),
                ],
            ),
            page(
                2,
                &[
                    ("某某股份有限公司 2023年年度报告", 30.0),
                    ("1.1公司简介", 70.0),
                    ("主要 会计 数据", 120.0),
                    ("§2经营情况", 350.0),
                    ("2", 800.0),
                ],
            )
            .with_table(TableRegion::from_strings(
                BoundingBox::new(40.0, 150.0, 550.0, 300.0),
                [["项目", "本期"], ["营业收入", "1,024"], ["", "万元"]],
            )),
        ],
    )
}

#[test]
fn test_convert_annual_report() {
    let source = annual_report();
    let info = DocumentInfo::from_path(&source.source);
    let mut processor = DocumentProcessor::new(ExtractOptions::default()).unwrap();
    let conversion = processor.convert(&source, &info).unwrap();

    assert_eq!(conversion.info.title, "某某股份2023年年度报告");
    assert_eq!(conversion.stats.pages, 2);
    assert_eq!(conversion.stats.header_records, 2);
    assert_eq!(conversion.stats.footer_records, 2);
    assert_eq!(conversion.stats.table_records, 1);

    let kinds: Vec<RecordKind> = conversion.records().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::Header,
            RecordKind::Text,
            RecordKind::Text,
            RecordKind::Footer,
            RecordKind::Header,
            RecordKind::Text,
            RecordKind::Text,
            RecordKind::Table,
            RecordKind::Text,
            RecordKind::Footer,
        ]
    );

    assert_eq!(conversion.items.len(), 2);
    assert_eq!(conversion.items[0].content, "§1重要提示 本公司董事会保证");
    assert_eq!(conversion.items[0].content_type, ContentType::Text);
    assert_eq!(
        conversion.items[1].content,
        "1.1公司简介 主要会计数据 §2经营情况\n| 项目 | 本期 |\n| --- | --- |\n| 营业收入 | 1,024万元 |"
    );
    assert_eq!(conversion.items[1].content_type, ContentType::Excel);
}

#[test]
fn test_section_index() {
    let source = annual_report();
    let mut processor = DocumentProcessor::new(ExtractOptions::default()).unwrap();
    let index = processor.process(&source).unwrap();

    assert_eq!(index.titles.section_count(), 2);
    let first = index.titles.section("1重要提示").unwrap();
    assert_eq!(first.numeric_id, 1);
    assert_eq!(first.subsections.len(), 1);
    assert_eq!(first.subsections[0].label, "1.1公司简介");
    assert_eq!(first.tables.len(), 1);
    assert_eq!(first.tables[0].caption, "主要会计数据");
    assert_eq!(first.tables[0].page, 2);
    assert_eq!(first.subsections[0].tables, first.tables);

    let second = index.titles.section("2经营情况").unwrap();
    assert!(second.tables.is_empty());
}

#[test]
fn test_table_before_any_section_is_standalone() {
    let source = JsonPageSource::from_pages(
        "t.pdf",
        vec![page(1, &[("目录 一 二 三 四", 50.0)]).with_table(TableRegion::from_strings(
            BoundingBox::new(40.0, 100.0, 550.0, 200.0),
            [["名称", "页码"], ["释义", "3"]],
        ))],
    );
    let mut processor = DocumentProcessor::new(ExtractOptions::default()).unwrap();
    let index = processor.process(&source).unwrap();

    let entries = index.titles.entries();
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        TitleEntry::Table(table) => assert_eq!(table.caption, "目录一二三四"),
        other => panic!("expected a table entry, got {:?}", other),
    }
}

struct FixedRasterizer;

impl Rasterizer for FixedRasterizer {
    fn rasterize(&self, page_number: u32, dpi: u32) -> Result<RasterImage> {
        Ok(RasterImage::new(page_number, dpi, b"\x89PNG\r\n\x1a\n".to_vec()))
    }
}

struct ScriptedEngine;

impl OcrEngine for ScriptedEngine {
    fn recognize(&self, image: &RasterImage, language: &str, layout: LayoutMode) -> Result<String> {
        assert_eq!(language, "chi_sim+eng");
        assert_eq!(layout.psm(), 4);
        match image.page {
            1 => Ok("§1 释义!!\n\n本报告  中 除非另有说明".to_string()),
            2 => Err(Error::Ocr("engine crashed".to_string())),
            _ => Ok("其他事项".to_string()),
        }
    }
}

#[test]
fn test_scanned_document_through_ocr() {
    let source = JsonPageSource::from_pages(
        "scan.pdf",
        vec![PageData::a4(1), PageData::a4(2), PageData::a4(3)],
    );
    let ocr = OcrPipeline::new(OcrConfig::default(), FixedRasterizer, ScriptedEngine).unwrap();
    let mut processor = DocumentProcessor::new(ExtractOptions::default())
        .unwrap()
        .with_ocr(ocr);
    let conversion = processor
        .convert(&source, &DocumentInfo::new("扫描件", "scan.pdf"))
        .unwrap();

    assert!(conversion.stats.scanned);
    assert_eq!(conversion.stats.ocr_pages, 2);
    assert_eq!(conversion.stats.empty_pages, 1);

    let pages: Vec<u32> = conversion.items.iter().map(|i| i.page).collect();
    assert_eq!(pages, vec![1, 3]);
    let first_page: Vec<&str> = conversion
        .records()
        .iter()
        .filter(|r| r.page == 1)
        .map(|r| r.content.as_str())
        .collect();
    assert_eq!(first_page, vec!["1 释义", "本报告 中 除非另有说明"]);
}

#[test]
fn test_batch_keeps_documents_apart() {
    let sources = vec![annual_report(), JsonPageSource::from_pages("empty.pdf", vec![])];
    let results = convert_batch(&sources, &ExtractOptions::default());

    let report = results[0].as_ref().unwrap();
    assert_eq!(report.records().len(), 10);
    let empty = results[1].as_ref().unwrap();
    assert!(empty.items.is_empty());
    assert!(empty.titles().is_empty());
}

#[test]
fn test_invalid_pattern_is_reported() {
    let mut options = ExtractOptions::default();
    options.boundaries.header = "(unclosed".to_string();
    assert!(matches!(DocumentProcessor::new(options), Err(Error::Pattern(_))));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_convert_async() {
    let processor = DocumentProcessor::new(ExtractOptions::default()).unwrap();
    let info = DocumentInfo::new("年报", "/data/年报.pdf");
    let conversion = pdfknowledge::convert_async(processor, annual_report(), info)
        .await
        .unwrap();
    assert_eq!(conversion.items.len(), 2);
    assert_eq!(conversion.items[0].title, "年报");
}
