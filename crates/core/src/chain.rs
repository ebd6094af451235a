use crate::embeddings::Embedder;
use crate::memory::ConversationMemory;
use crate::models::{ChainAnswer, RetrievedChunk};
use crate::traits::{ChatModel, VectorIndex};
use crate::ChatError;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 4;

const CONDENSE_QUESTION_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.\n\n\
Chat History:\n{chat_history}\nFollow Up Input: {question}\nStandalone question:";

const QA_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{context}\n\nQuestion: {question}\nHelpful Answer:";

pub fn condense_question_prompt(chat_history: &str, question: &str) -> String {
    CONDENSE_QUESTION_TEMPLATE
        .replace("{chat_history}", chat_history)
        .replace("{question}", question)
}

pub fn qa_prompt(context: &[RetrievedChunk], question: &str) -> String {
    let context = context
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    QA_TEMPLATE
        .replace("{context}", &context)
        .replace("{question}", question)
}

/// Retrieval chain over one index plus the memory of the conversation held
/// against it.
pub struct ConversationalChain {
    index: Arc<dyn VectorIndex>,
    memory: ConversationMemory,
    top_k: usize,
}

impl ConversationalChain {
    pub fn new(index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            index,
            memory: ConversationMemory::new(),
            top_k: top_k.max(1),
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn indexed_chunks(&self) -> usize {
        self.index.len()
    }

    /// Answers `question` and records the turn. Memory is only touched once
    /// the answer has been generated.
    pub async fn ask(
        &mut self,
        question: &str,
        embedder: &dyn Embedder,
        llm: &dyn ChatModel,
    ) -> Result<ChainAnswer, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::InvalidArgument("question is empty".to_string()));
        }

        let standalone = if self.memory.is_empty() {
            question.to_string()
        } else {
            let prompt = condense_question_prompt(&self.memory.render(), question);
            llm.complete(&prompt).await?.trim().to_string()
        };

        let query_vector = embedder.embed_query(&standalone).await?;
        let context = self.index.search(&query_vector, self.top_k)?;
        debug!(
            standalone = %standalone,
            chunks = ?context.iter().map(|chunk| chunk.chunk_index).collect::<Vec<_>>(),
            nearest = context.first().map(|chunk| chunk.distance),
            "retrieved context for question"
        );

        let answer = llm.complete(&qa_prompt(&context, &standalone)).await?;
        let answer = answer.trim().to_string();

        self.memory.record_turn(question, answer.clone());

        Ok(ChainAnswer {
            answer,
            history: self.memory.messages().to_vec(),
        })
    }
}
