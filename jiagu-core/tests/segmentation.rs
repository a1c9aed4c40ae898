use std::io::Cursor;
use std::sync::Arc;

use jiagu_core::corpus::Sentence;
use jiagu_core::tokenizer::{split_blocks, Block};
use jiagu_core::{SegMode, Segmenter, SequenceTagger, TrainOptions, Vocabulary};

const DICT: &str = "汉服\t10\n和\t10\n服装\t10\n和服\t10\n维基\t10\n图谱\t10\n厦门\t10\n明天\t10\n会\t5\n不\t5\n会不会\t8\n下雨\t10\n";

fn segmenter() -> Segmenter {
    Segmenter::new(Vocabulary::from_reader(Cursor::new(DICT)).unwrap())
}

#[test]
fn add_and_delete_user_word() {
    let seg = segmenter();
    let text = "汉服和服装、维基图谱";
    assert_eq!(
        seg.seg(text, SegMode::Default).unwrap(),
        vec!["汉服", "和", "服装", "、", "维基", "图谱"]
    );

    seg.add_vocab("汉服和服装", 1);
    assert_eq!(seg.seg(text, SegMode::Default).unwrap(), vec!["汉服和服装", "、", "维基", "图谱"]);

    seg.delete_vocab("汉服和服装", 0);
    assert_eq!(
        seg.seg(text, SegMode::Default).unwrap(),
        vec!["汉服", "和", "服装", "、", "维基", "图谱"]
    );
}

#[test]
fn user_dictionary_is_merged() {
    let seg = segmenter();
    seg.load_user_dict(Cursor::new("维基图谱\t100\n")).unwrap();
    assert_eq!(seg.seg("维基图谱", SegMode::Default).unwrap(), vec!["维基图谱"]);
}

#[test]
fn segmentable_blocks_are_partitioned() {
    let seg = segmenter();
    let text = "厦门明天会不会下雨abc汉服和服装100%维基";
    for block in split_blocks(text) {
        if let Block::Segmentable(s) = block {
            assert_eq!(seg.cut_vocab(s).concat(), s);
        }
    }
    // blocos não segmentáveis viram caracteres avulsos, espaços inclusive
    let words = seg.seg("厦门 ，明天！", SegMode::Default).unwrap();
    assert_eq!(words, vec!["厦门", " ", "，", "明天", "！"]);
}

#[test]
fn output_concatenates_back_to_input() {
    let seg = segmenter();
    for text in ["hello world 厦门 明天", "  会不会\t下雨？\n", "汉服和服装、 维基图谱"] {
        assert_eq!(seg.seg(text, SegMode::Default).unwrap().concat(), text);
    }
}

#[test]
fn ascii_runs_are_coalesced() {
    let seg = segmenter();
    assert_eq!(seg.seg("明天abc下雨", SegMode::Default).unwrap(), vec!["明天", "abc", "下雨"]);
}

#[test]
fn probe_leaves_dictionary_unchanged() {
    let vocab = Vocabulary::from_reader(Cursor::new("宝\t1\n清\t1\n镇\t10\n县\t10\n")).unwrap();
    let mut corpus = vec![
        Sentence::bmes_from_words(&["宝清", "镇"]),
        Sentence::bmes_from_words(&["宝清", "县"]),
    ];
    let mut model = SequenceTagger::new();
    model
        .train(&mut corpus, TrainOptions { iterations: 10, shuffle: true, seed: Some(7) })
        .unwrap();
    let seg = Arc::new(Segmenter::with_model(vocab, model));

    let mut before = seg.vocab().snapshot();
    before.sort();
    let total = seg.vocab().total_frequency();
    let max_len = seg.vocab().max_word_len();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let seg = Arc::clone(&seg);
            std::thread::spawn(move || seg.seg("宝清镇，宝清县", SegMode::Probe).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec!["宝清", "镇", "，", "宝清", "县"]);
    }

    let mut after = seg.vocab().snapshot();
    after.sort();
    assert_eq!(after, before);
    assert_eq!(seg.vocab().total_frequency(), total);
    assert_eq!(seg.vocab().max_word_len(), max_len);
}

#[test]
fn model_mode_uses_bmes_labels() {
    let mut corpus = vec![Sentence::bmes_from_words(&["会不会", "下雨"])];
    let mut model = SequenceTagger::new();
    model.train(&mut corpus, TrainOptions::default()).unwrap();
    let seg = Segmenter::with_model(Vocabulary::new(), model);
    assert_eq!(seg.seg("会不会下雨", SegMode::Model).unwrap(), vec!["会不会", "下雨"]);
}
