//! Instruction templates for the grader, rewriter and generator
//!
//! All templates are Arabic; the corpus and the users are Egyptian.

use std::sync::Arc;

use crate::domain::llm::Message;
use crate::domain::retrieval::Candidate;

pub const GRADER_SYSTEM_PROMPT: &str = "أنت مقيّم قانوني. مهمتك أن تحدد هل يتناول المستند موضوع السؤال القانوني.

## القاعدة:
- المستند يتناول الموضوع العام نفسه للسؤال = relevant
- المستند يتناول موضوعاً مختلفاً تماماً = irrelevant

## أمثلة:
- سؤال عن \"الملكية\" ومستند عن \"الحقوق العينية\" = relevant
- سؤال عن \"الملكية\" ومستند عن \"الزواج\" = irrelevant

## التعليمات:
- أجب بكلمة واحدة فقط: relevant أو irrelevant
- لا تضف أي شرح";

pub const REWRITER_SYSTEM_PROMPT: &str = "أنت متخصص في تحسين استعلامات البحث في التشريعات المصرية.

## المهمة
أعد صياغة السؤال ليصبح أكثر فعالية في البحث داخل نصوص القوانين.

## الاستراتيجيات
1. التوسيع: إذا كان السؤال ضيقاً جداً فوسّعه (\"عقوبة السرقة ليلاً\" ← \"عقوبة السرقة وظروفها المشددة\")
2. التخصيص: إذا كان السؤال عاماً فخصّصه (\"حقوق المرأة\" ← \"حقوق المرأة في الميراث\")
3. المرادفات القانونية: استخدم مصطلحاً بديلاً (\"فسخ العقد\" ← \"انحلال الرابطة التعاقدية\")
4. ذكر القانون المحتمل: (\"عقوبة القتل\" ← \"عقوبة القتل العمد في قانون العقوبات\")

## التعليمات
- اكتب السؤال المعاد صياغته فقط، دون شرح
- حافظ على المعنى الأصلي
- استخدم العربية الفصحى في جملة واحدة واضحة
- لا تكرر أي صياغة سبق تجربتها";

pub const GENERATOR_SYSTEM_PROMPT: &str = "أنت مساعد قانوني متخصص في القانون المصري.

## القواعد
1. اعتمد فقط على المستندات المرقمة المقدمة إليك، ولا تستخدم معرفتك العامة.
2. بعد كل معلومة قانونية ضع رقم المستند الذي يدعمها بين قوسين مربعين، مثل [1] أو [2].
3. اذكر رقم المادة واسم القانون عند الاستشهاد.
4. ابدأ بالإجابة المباشرة ثم التفاصيل، وفرّق بين الشروط والآثار والجزاءات.
5. إذا لم تكفِ المستندات للإجابة فقل ذلك بوضوح.
6. اختم بتنبيه بضرورة استشارة محامٍ في الحالات الحساسة.";

/// Messages asking for a one-token relevance verdict
pub fn grader_messages(query: &str, candidate: &Candidate) -> Vec<Message> {
    let user = format!(
        "## السؤال القانوني:\n{}\n\n## المستند للتقييم:\n{}\n\n## الحكم (relevant أو irrelevant فقط):",
        query, candidate.text
    );

    vec![Message::system(GRADER_SYSTEM_PROMPT), Message::user(user)]
}

/// Messages asking for a single reformulated question
pub fn rewriter_messages(current: &str, history: &[String]) -> Vec<Message> {
    let mut user = format!("## السؤال الذي لم يحقق نتائج:\n{}\n", current);

    let earlier: Vec<&String> = history.iter().filter(|q| q.as_str() != current).collect();
    if !earlier.is_empty() {
        user.push_str("\n## صياغات سبقت تجربتها:\n");
        for query in earlier {
            user.push_str(&format!("- {}\n", query));
        }
    }

    user.push_str("\n## السؤال المعاد صياغته:");

    vec![Message::system(REWRITER_SYSTEM_PROMPT), Message::user(user)]
}

/// Numbered context block, one `[n] citation` header per passage
pub fn format_context(context: &[Arc<Candidate>]) -> String {
    context
        .iter()
        .enumerate()
        .map(|(i, candidate)| format!("[{}] {}\n{}", i + 1, candidate.citation, candidate.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Messages asking for a cited answer grounded in `context`
pub fn generator_messages(query: &str, context: &[Arc<Candidate>]) -> Vec<Message> {
    let user = format!(
        "## السؤال القانوني:\n{}\n\n## المستندات القانونية المتاحة:\n{}\n\n## إجابتك (مع أرقام المستندات):",
        query,
        format_context(context)
    );

    vec![Message::system(GENERATOR_SYSTEM_PROMPT), Message::user(user)]
}
